//! Configuration module for Sumi-Sieve
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sieve::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sieve.toml")).unwrap();
//! println!("Crawling under: {}", config.crawler.domain_prefix);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, IndexConfig, IndexTierConfig, SearchConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::MIN_WRITER_MEMORY;
