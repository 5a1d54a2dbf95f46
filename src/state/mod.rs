//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks where a single URL stands (pending, visiting, visited)

mod page_state;

pub use page_state::PageState;
