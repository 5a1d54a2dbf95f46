//! Sumi-Sieve main entry point
//!
//! This is the command-line interface for the Sumi-Sieve crawler and search
//! index.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sumi_sieve::config::{load_config_with_hash, Config};
use sumi_sieve::crawler::crawl;
use sumi_sieve::output::{
    load_index_summary, print_crawl_report, print_index_summary, print_results, results_to_json,
};
use sumi_sieve::search::QueryEngine;
use sumi_sieve::storage::open_store_read_only;
use tracing_subscriber::EnvFilter;

/// Sumi-Sieve: crawl one site, then search it
///
/// Sumi-Sieve crawls every page under a domain prefix, indexes each page's
/// title and text, and answers free-text queries with ranked, highlighted
/// results.
#[derive(Parser, Debug)]
#[command(name = "sumi-sieve")]
#[command(version)]
#[command(about = "A bounded-domain crawler with full-text search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from the seed URL into a fresh index
    Crawl,

    /// Query an existing index
    Search {
        /// Query terms, joined with spaces
        #[arg(required = true, value_name = "QUERY")]
        query: Vec<String>,

        /// Disable fuzzy matching for this query
        #[arg(long)]
        exact: bool,

        /// Maximum number of results (defaults to the configured value)
        #[arg(long, value_name = "N")]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many documents the index holds
    Stats,

    /// Validate the configuration and print it without crawling
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl => handle_crawl(&config).await,
        Command::Search {
            query,
            exact,
            limit,
            json,
        } => handle_search(&config, &query.join(" "), exact, limit, json),
        Command::Stats => handle_stats(&config),
        Command::Check => handle_check(&config, &config_hash),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sieve=info,warn"),
            1 => EnvFilter::new("sumi_sieve=debug,info"),
            2 => EnvFilter::new("sumi_sieve=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Fails early when the index has never been built
fn ensure_index_exists(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.index.path);
    if !path.exists() {
        bail!(
            "No index at {}; run the crawl command first",
            path.display()
        );
    }
    Ok(())
}

/// Handles the `check` command: validates config and shows what would be crawled
fn handle_check(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Sumi-Sieve Configuration Check ===\n");

    println!("Crawler:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Domain prefix: {}", config.crawler.domain_prefix);
    println!("  Timeout: {}s", config.crawler.timeout_seconds);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);

    println!("\nIndex:");
    println!("  Path: {}", config.index.path);
    println!("  Tier: {:?}", config.index.tier);
    println!("  Writer memory: {} bytes", config.index.writer_memory_bytes);

    println!("\nSearch:");
    println!("  Fuzzy: {}", config.search.fuzzy);
    println!("  Max results: {}", config.search.max_results);
    println!("  Context chars: {}", config.search.context_chars);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    println!(
        "✓ Would crawl from {} and replace the index at {}",
        config.crawler.seed_url, config.index.path
    );

    Ok(())
}

/// Handles the `crawl` command
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl from {} (scope: {})",
        config.crawler.seed_url,
        config.crawler.domain_prefix
    );

    let stats = crawl(config).await.context("Crawl failed")?;
    tracing::info!("Crawl completed successfully");

    print_crawl_report(&stats);
    Ok(())
}

/// Handles the `search` command
fn handle_search(
    config: &Config,
    query: &str,
    exact: bool,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    ensure_index_exists(config)?;
    let store = open_store_read_only(&config.index)?;

    let fuzzy = config.search.fuzzy && !exact;
    let max_results = limit.unwrap_or(config.search.max_results);

    let results = {
        let engine =
            QueryEngine::new(store.as_ref()).with_context_chars(config.search.context_chars);
        engine
            .try_search(query, fuzzy, max_results)
            .with_context(|| format!("Search for \"{}\" failed", query))?
    };
    store.close()?;

    if json {
        println!("{}", results_to_json(&results)?);
    } else {
        print_results(query, &results);
    }

    Ok(())
}

/// Handles the `stats` command
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    ensure_index_exists(config)?;
    let store = open_store_read_only(&config.index)?;

    let summary = load_index_summary(store.as_ref(), Path::new(&config.index.path))?;
    store.close()?;

    print_index_summary(&summary);
    Ok(())
}
