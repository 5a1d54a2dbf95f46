//! Statistics reporting for crawls and indexes
//!
//! This module turns a finished [`CrawlStats`] and an opened index into
//! human-readable summaries on stdout.

use crate::crawler::CrawlStats;
use crate::storage::{IndexStore, IndexTier};
use crate::SumiError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Snapshot of an existing index
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    /// Location of the index on disk
    pub path: PathBuf,

    /// Which backend the index was opened with
    pub tier: IndexTier,

    /// Number of stored documents
    pub documents: u64,
}

/// Reads a summary from an opened store
///
/// # Arguments
///
/// * `store` - The opened index
/// * `path` - Where the index lives, for display
///
/// # Returns
///
/// * `Ok(IndexSummary)` - Successfully counted documents
/// * `Err(SumiError)` - The store could not be queried
pub fn load_index_summary(store: &dyn IndexStore, path: &Path) -> Result<IndexSummary, SumiError> {
    Ok(IndexSummary {
        path: path.to_path_buf(),
        tier: store.tier(),
        documents: store.count()?,
    })
}

/// Prints an index summary to stdout
pub fn print_index_summary(summary: &IndexSummary) {
    println!("=== Index Summary ===\n");
    println!("  Location: {}", summary.path.display());
    println!("  Tier: {}", summary.tier);
    println!("  Documents: {}", summary.documents);
}

/// Share of visited pages that ended up in the index, in percent
fn store_rate(stats: &CrawlStats) -> f64 {
    if stats.pages_visited > 0 {
        (stats.pages_stored as f64 / stats.pages_visited as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints a finished crawl's counters to stdout
///
/// # Arguments
///
/// * `stats` - Counters returned by the crawl
pub fn print_crawl_report(stats: &CrawlStats) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Documents in index: {}", stats.documents_indexed);
    if let Some(duration) = stats.duration() {
        let millis = duration.num_milliseconds().max(0);
        println!("  Duration: {}.{:03}s", millis / 1000, millis % 1000);
    }
    println!();

    let failures = stats.fetch_failures + stats.extraction_failures + stats.index_write_failures;
    if failures > 0 {
        println!("Failures:");
        println!("  Fetch: {}", stats.fetch_failures);
        println!("  Extraction: {}", stats.extraction_failures);
        println!("  Index write: {}", stats.index_write_failures);
        println!();
    }

    println!(
        "Store Rate: {:.1}% ({} / {} pages stored)",
        store_rate(stats),
        stats.pages_stored,
        stats.pages_visited
    );
}
