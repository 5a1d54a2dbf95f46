//! Search module: ranked, highlighted queries over the page index
//!
//! - `QueryEngine`: runs queries against any `IndexStore`
//! - `highlight` / `excerpt`: escape text and mark matching terms
//! - `SearchResult`: serializable hit for a front end

mod engine;
mod highlight;
mod types;

pub use engine::{QueryEngine, DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_RESULTS};
pub use highlight::{excerpt, highlight, ELLIPSIS, MARK_CLOSE, MARK_OPEN};
pub use types::SearchResult;
