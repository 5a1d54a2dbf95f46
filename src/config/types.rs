use crate::search::{DEFAULT_CONTEXT_CHARS, DEFAULT_MAX_RESULTS};
use serde::Deserialize;

/// Main configuration structure for Sumi-Sieve
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Crawl entry point settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The first URL pushed onto the agenda
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Literal prefix every crawled URL must start with
    #[serde(rename = "domain-prefix")]
    pub domain_prefix: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiSieve".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Which index implementation backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexTierConfig {
    /// Stemmed, fuzzy, ranked full-text index
    #[default]
    Indexed,
    /// Case-insensitive substring matching (degraded fallback)
    Substring,
}

/// Index location and writer settings
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Directory (indexed tier) or file (substring tier) holding the index
    pub path: String,

    #[serde(default)]
    pub tier: IndexTierConfig,

    /// Memory budget for the full-text index writer
    #[serde(rename = "writer-memory-bytes", default = "default_writer_memory")]
    pub writer_memory_bytes: usize,
}

/// Query defaults used by the search command
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub fuzzy: bool,

    #[serde(rename = "max-results", default = "default_max_results")]
    pub max_results: usize,

    /// Width of the excerpt window around the first match
    #[serde(rename = "context-chars", default = "default_context_chars")]
    pub context_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: true,
            max_results: default_max_results(),
            context_chars: default_context_chars(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    5
}

fn default_writer_memory() -> usize {
    50_000_000
}

fn default_true() -> bool {
    true
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_context_chars() -> usize {
    DEFAULT_CONTEXT_CHARS
}
