//! Content extraction from parsed HTML
//!
//! This module derives from a fetched page:
//! - A title (`<title>`, else the first `<h1>`, else the page URL)
//! - A flattened text body with script and style content removed
//! - The raw `href` of every anchor, in document order

use scraper::{Html, Node, Selector};
use thiserror::Error;

/// A fetched and parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses an HTML body; malformed markup is repaired, never rejected
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }
}

/// Title and text of a page, ready to be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
}

/// Why a page yielded nothing to index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("page has no text content")]
    NoContent,

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Elements whose text never counts as content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector(format!("{}: {:?}", css, e)))
}

/// Extracts the page title
///
/// # Arguments
///
/// * `doc` - The parsed page
/// * `url` - Returned when the page has neither a title nor a heading
///
/// # Returns
///
/// The trimmed `<title>` text if non-empty, else the first `<h1>` text
/// (each text node trimmed, joined with single spaces) if non-empty, else
/// `url`.
pub fn extract_title(doc: &Document, url: &str) -> Result<String, ExtractionError> {
    let title_selector = selector("title")?;
    let declared = doc
        .html
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    if let Some(title) = declared {
        return Ok(title);
    }

    let heading_selector = selector("h1")?;
    let heading = doc
        .html
        .select(&heading_selector)
        .next()
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty());

    Ok(heading.unwrap_or_else(|| url.to_string()))
}

/// Flattens the page text into a single string
///
/// Text inside `<script>` and `<style>` is ignored. Every other text node is
/// trimmed, empty nodes are dropped, and the rest are joined with single
/// spaces.
pub fn extract_body(doc: &Document) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in doc.html.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// Collects the `href` of every anchor that has one
///
/// Values are returned as written, in document order. Resolution and
/// filtering are left to the caller.
pub fn extract_links(doc: &Document) -> Result<Vec<String>, ExtractionError> {
    let anchor_selector = selector("a[href]")?;
    Ok(doc
        .html
        .select(&anchor_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect())
}

/// Extracts title and body for indexing
///
/// # Returns
///
/// * `Ok(ExtractedContent)` - The page has text to index
/// * `Err(ExtractionError::NoContent)` - The flattened body is empty
/// * `Err(ExtractionError::Selector)` - A built-in selector failed to parse
pub fn extract(doc: &Document, url: &str) -> Result<ExtractedContent, ExtractionError> {
    let content = extract_body(doc);
    if content.is_empty() {
        return Err(ExtractionError::NoContent);
    }

    let title = extract_title(doc, url)?;
    Ok(ExtractedContent { title, content })
}
