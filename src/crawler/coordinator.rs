//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives the frontier to
//! exhaustion:
//! - Pop the next URL (depth first) and mark it visited
//! - Fetch it; a failure is counted and the loop moves on
//! - Resolve and enqueue in-scope links
//! - Extract title and text and upsert them into the index

use crate::crawler::extractor::{extract, extract_links, Document, ExtractionError};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::state::PageState;
use crate::storage::{IndexStore, PageRecord};
use crate::url::{in_scope, resolve, NormalizedUrl};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Progress is logged every this many visited pages
const PROGRESS_INTERVAL: u64 = 10;

/// Counters collected over one crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Pages popped from the agenda; equals the size of the visited set
    pub pages_visited: u64,
    /// Pages upserted into the index
    pub pages_stored: u64,
    pub fetch_failures: u64,
    pub extraction_failures: u64,
    pub index_write_failures: u64,
    /// In-scope links pushed onto the agenda
    pub links_discovered: u64,
    /// Documents in the index once the crawl finished
    pub documents_indexed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlStats {
    fn new() -> Self {
        Self {
            pages_visited: 0,
            pages_stored: 0,
            fetch_failures: 0,
            extraction_failures: 0,
            index_write_failures: 0,
            links_discovered: 0,
            documents_indexed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Wall-clock duration of the crawl, if it has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

/// Main crawler coordinator structure
///
/// Owns the frontier and the fetcher, and borrows the index store for the
/// length of the crawl.
pub struct Coordinator<'a> {
    fetcher: Fetcher,
    store: &'a mut dyn IndexStore,
    domain_prefix: String,
    frontier: Frontier,
    stats: CrawlStats,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator whose agenda holds only the seed
    ///
    /// # Arguments
    ///
    /// * `seed` - First URL to visit
    /// * `domain_prefix` - Discovered links must start with this prefix
    /// * `fetcher` - HTTP fetcher with the configured timeout
    /// * `store` - Index receiving the extracted pages
    pub fn new(
        seed: NormalizedUrl,
        domain_prefix: impl Into<String>,
        fetcher: Fetcher,
        store: &'a mut dyn IndexStore,
    ) -> Self {
        Self {
            fetcher,
            store,
            domain_prefix: domain_prefix.into(),
            frontier: Frontier::with_seed(seed),
            stats: CrawlStats::new(),
        }
    }

    /// Runs the crawl loop until the agenda is empty
    ///
    /// Per-page failures are logged and counted; nothing aborts the loop.
    pub async fn run(&mut self) -> CrawlStats {
        info!(prefix = %self.domain_prefix, "Starting crawl");
        let start_time = Instant::now();

        while let Some(url) = self.frontier.pop() {
            self.stats.pages_visited += 1;

            self.process_url(&url).await;

            if !self.frontier.finish(&url) {
                warn!(url = %url, "Page finished out of order");
            }

            if self.stats.pages_visited % PROGRESS_INTERVAL == 0 {
                let rate = self.stats.pages_visited as f64 / start_time.elapsed().as_secs_f64();
                info!(
                    "Progress: {} pages visited, {} stored, {} pending, {:.2} pages/sec",
                    self.stats.pages_visited,
                    self.stats.pages_stored,
                    self.frontier.pending_len(),
                    rate
                );
            }
        }

        self.stats.finished_at = Some(Utc::now());
        info!(
            "Crawl completed: {} pages visited, {} stored in {:?}",
            self.frontier.visited_len(),
            self.stats.pages_stored,
            start_time.elapsed()
        );

        self.stats.clone()
    }

    /// Where a URL stands in this crawl
    pub fn state_of(&self, url: &NormalizedUrl) -> Option<PageState> {
        self.frontier.state_of(url)
    }

    /// URLs visited so far
    pub fn visited(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.frontier.visited()
    }

    /// Fetches one page, enqueues its links and stores its content
    async fn process_url(&mut self, url: &NormalizedUrl) {
        let doc = match self.fetcher.fetch(url.as_str()).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                self.stats.fetch_failures += 1;
                return;
            }
        };

        self.handle_discovered_links(url, &doc);
        self.store_page(url, &doc);
    }

    /// Resolves every link on the page and pushes the in-scope ones
    fn handle_discovered_links(&mut self, base: &NormalizedUrl, doc: &Document) {
        let hrefs = match extract_links(doc) {
            Ok(hrefs) => hrefs,
            Err(e) => {
                error!(url = %base, error = %e, "Link extraction failed");
                return;
            }
        };

        for href in hrefs {
            let target = match resolve(base.as_str(), &href) {
                Ok(target) => target,
                Err(e) => {
                    debug!("Skipping link {}: {}", href, e);
                    continue;
                }
            };

            if !in_scope(target.as_str(), &self.domain_prefix) {
                debug!("Skipping out-of-scope link {}", target);
                continue;
            }

            if self.frontier.push(target) {
                self.stats.links_discovered += 1;
            }
        }
    }

    /// Extracts title and text and upserts them
    fn store_page(&mut self, url: &NormalizedUrl, doc: &Document) {
        let content = match extract(doc, url.as_str()) {
            Ok(content) => content,
            Err(ExtractionError::NoContent) => {
                warn!(url = %url, "No text content, page not stored");
                self.stats.extraction_failures += 1;
                return;
            }
            Err(e) => {
                error!(url = %url, error = %e, "Content extraction failed");
                self.stats.extraction_failures += 1;
                return;
            }
        };

        let record = PageRecord {
            url: url.to_string(),
            title: content.title,
            content: content.content,
        };

        match self.store.upsert(&record) {
            Ok(()) => {
                self.stats.pages_stored += 1;
                info!(
                    "Stored: {} - {} ({} chars)",
                    record.url,
                    record.display_title(),
                    record.content.chars().count()
                );
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Index write failed");
                self.stats.index_write_failures += 1;
            }
        }
    }
}
