//! Output module for crawl reports and search listings
//!
//! This module handles:
//! - Summarizing a finished crawl
//! - Describing an existing index
//! - Rendering search results as text or JSON

pub mod results;
pub mod stats;

pub use results::{print_results, results_to_json};
pub use stats::{load_index_summary, print_crawl_report, print_index_summary, IndexSummary};
