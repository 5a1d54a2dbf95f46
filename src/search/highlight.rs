//! Excerpt selection and match highlighting
//!
//! All query terms are compiled into one case-insensitive alternation.
//! Window arithmetic is done in chars. Match spans are found on the raw text,
//! then the text is HTML-escaped segment by segment, so a marker never lands
//! inside an entity or inside another marker.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Opening highlight marker
pub const MARK_OPEN: &str = "<mark>";

/// Closing highlight marker
pub const MARK_CLOSE: &str = "</mark>";

/// Appended or prepended where an excerpt was clipped
pub const ELLIPSIS: &str = "...";

/// Compiles the non-empty terms into a single case-insensitive pattern
///
/// Longer terms come first so that, at a shared start position, the longest
/// term is the one matched. Terms of equal length keep query order.
fn term_pattern(terms: &[String]) -> Option<Regex> {
    let mut words: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));

    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&alternation).case_insensitive(true).build() {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!(error = %e, "Cannot compile highlight pattern");
            None
        }
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Byte offset of the `n`th char, or the end of the text
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

fn highlight_with(text: &str, pattern: Option<&Regex>) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut cursor = 0;

    if let Some(pattern) = pattern {
        for found in pattern.find_iter(text) {
            escape_into(&mut out, &text[cursor..found.start()]);
            out.push_str(MARK_OPEN);
            escape_into(&mut out, found.as_str());
            out.push_str(MARK_CLOSE);
            cursor = found.end();
        }
    }
    escape_into(&mut out, &text[cursor..]);

    out
}

/// HTML-escapes `text` and wraps every case-insensitive occurrence of any
/// term in highlight markers
///
/// # Examples
///
/// ```
/// use sumi_sieve::search::highlight;
///
/// let terms = vec!["egg".to_string()];
/// assert_eq!(highlight("Egg & <b>", &terms), "<mark>Egg</mark> &amp; &lt;b&gt;");
/// ```
pub fn highlight(text: &str, terms: &[String]) -> String {
    highlight_with(text, term_pattern(terms).as_ref())
}

/// Builds a highlighted excerpt around the earliest match of any term
///
/// # Arguments
///
/// * `content` - Full page text
/// * `terms` - Raw query terms
/// * `context_chars` - Window width; half of it is kept on each side of the
///   first match
///
/// # Returns
///
/// The window `[pos - ctx/2, pos + len(match) + ctx/2]` clipped to the text,
/// with `...` on each clipped side, escaped and highlighted. When no term
/// occurs, the first `context_chars` chars followed by `...`.
pub fn excerpt(content: &str, terms: &[String], context_chars: usize) -> String {
    let pattern = term_pattern(terms);
    let mut out = String::new();

    let Some(first) = pattern.as_ref().and_then(|p| p.find(content)) else {
        escape_into(&mut out, &content[..byte_offset(content, context_chars)]);
        out.push_str(ELLIPSIS);
        return out;
    };

    let total = content.chars().count();
    let pos = content[..first.start()].chars().count();
    let len = first.as_str().chars().count();

    let half = context_chars / 2;
    let start = pos.saturating_sub(half);
    let end = (pos + len + half).min(total);
    let window = &content[byte_offset(content, start)..byte_offset(content, end)];

    if start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(&highlight_with(window, pattern.as_ref()));
    if end < total {
        out.push_str(ELLIPSIS);
    }
    out
}
