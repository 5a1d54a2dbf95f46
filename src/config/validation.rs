use crate::config::types::{Config, CrawlerConfig, IndexConfig, SearchConfig, UserAgentConfig};
use crate::ConfigError;
use std::path::{Component, Path};
use url::Url;

/// Smallest writer budget the full-text index accepts per thread
pub const MIN_WRITER_MEMORY: usize = 15_000_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_index_config(&config.index)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed-url '{}': {}", config.seed_url, e))
    })?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must use http or https",
            config.seed_url
        )));
    }

    if config.domain_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "domain-prefix cannot be empty".to_string(),
        ));
    }

    // The seed goes through normalization before the scope check in the crawl loop
    let normalized = crate::url::normalize(&config.seed_url)
        .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
    if !crate::url::in_scope(normalized.as_str(), &config.domain_prefix) {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' does not start with domain-prefix '{}'",
            normalized, config.domain_prefix
        )));
    }

    if config.timeout_seconds < 1 || config.timeout_seconds > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-seconds must be between 1 and 300, got {}",
            config.timeout_seconds
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates index configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "index path cannot be empty".to_string(),
        ));
    }

    // The crawl deletes this location, so it must name an entry of its own
    let names_entry = matches!(
        Path::new(config.path.trim()).components().next_back(),
        Some(Component::Normal(_))
    );
    if !names_entry {
        return Err(ConfigError::Validation(format!(
            "index path '{}' must name a file or directory, not a root or relative marker",
            config.path
        )));
    }

    if config.writer_memory_bytes < MIN_WRITER_MEMORY {
        return Err(ConfigError::Validation(format!(
            "writer-memory-bytes must be >= {}, got {}",
            MIN_WRITER_MEMORY, config.writer_memory_bytes
        )));
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_results < 1 {
        return Err(ConfigError::Validation(
            "max-results must be >= 1".to_string(),
        ));
    }

    if config.context_chars < 10 {
        return Err(ConfigError::Validation(format!(
            "context-chars must be >= 10, got {}",
            config.context_chars
        )));
    }

    Ok(())
}
