//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded timeout
//! - Title, text and link extraction
//! - The visited set and depth-first agenda
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;

pub use coordinator::{Coordinator, CrawlStats};
pub use extractor::{
    extract, extract_body, extract_links, extract_title, Document, ExtractedContent,
    ExtractionError,
};
pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use frontier::Frontier;

use crate::config::Config;
use crate::storage::{open_store, reset_location};
use crate::url::normalize;
use crate::SumiError;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Remove whatever is at the index location
/// 3. Open the configured index tier
/// 4. Crawl from the seed until the agenda is empty
/// 5. Close the index
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed; per-page failures are counted inside
/// * `Err(SumiError)` - The index could not be reset, opened or closed
pub async fn crawl(config: &Config) -> Result<CrawlStats, SumiError> {
    let seed = normalize(&config.crawler.seed_url)?;
    let fetcher = Fetcher::new(
        &config.user_agent,
        Duration::from_secs(config.crawler.timeout_seconds),
    )?;

    let index_path = Path::new(&config.index.path);
    reset_location(index_path).map_err(|e| SumiError::IndexOpen {
        path: index_path.to_path_buf(),
        message: format!("cannot clear previous index: {}", e),
    })?;
    info!("Cleared index location {}", index_path.display());

    let mut store = open_store(&config.index)?;

    let mut stats = {
        let mut coordinator = Coordinator::new(
            seed,
            config.crawler.domain_prefix.as_str(),
            fetcher,
            store.as_mut(),
        );
        coordinator.run().await
    };

    stats.documents_indexed = store.count()?;
    store.close()?;

    info!("Index contains {} documents", stats.documents_indexed);
    Ok(stats)
}
