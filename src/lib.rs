//! Sumi-Sieve: a bounded-domain crawler with a searchable page index
//!
//! This crate crawls every page under a domain prefix, extracts the readable
//! text of each page, stores it in a local full-text index, and answers
//! free-text queries with ranked, highlighted results.

pub mod config;
pub mod crawler;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sumi-Sieve operations
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Failed to open index at {path}: {message}")]
    IndexOpen { path: PathBuf, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Cannot resolve '{href}' against {base}: {reason}")]
    Resolve {
        base: String,
        href: String,
        reason: String,
    },
}

/// Result type alias for Sumi-Sieve operations
pub type Result<T> = std::result::Result<T, SumiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlStats};
pub use search::{QueryEngine, SearchResult};
pub use state::PageState;
pub use storage::{IndexStore, IndexTier, PageRecord};
pub use url::{in_scope, normalize, resolve, NormalizedUrl};
