use serde::Serialize;

/// One ranked, highlighted hit
///
/// `title` and `excerpt` are HTML-escaped with matches wrapped in `<mark>`,
/// ready to be embedded in a results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub score: f32,
}
