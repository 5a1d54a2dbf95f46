//! Storage module for the page index
//!
//! This module handles everything persisted by a crawl:
//! - The [`IndexStore`] trait shared by crawler and query engine
//! - The tantivy full-text tier (stemmed, fuzzy, ranked)
//! - The SQLite substring tier (degraded fallback)
//! - Resetting the index location before a fresh crawl

mod fulltext;
mod schema;
mod sqlite;
mod traits;

pub use fulltext::{FullTextIndex, CONTENT_BOOST, TITLE_BOOST};
pub use sqlite::{SubstringIndex, SUBSTRING_SCORE};
pub use traits::{IndexStore, StorageError, StorageResult};

use crate::config::{IndexConfig, IndexTierConfig};
use crate::SumiError;
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

/// A page as stored in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Normalized, fragment-free URL; the unique key
    pub url: String,
    pub title: String,
    pub content: String,
}

impl PageRecord {
    /// Title to store and display, falling back to the URL when blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// A query hit before excerpting
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: PageRecord,
    pub score: f32,
}

/// Index implementation in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexTier {
    /// tantivy full-text index
    Indexed,
    /// SQLite substring matching
    Substring,
}

impl IndexTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Substring => "substring",
        }
    }

    /// Returns true if the tier honours the `fuzzy` query flag
    pub fn supports_fuzzy(&self) -> bool {
        matches!(self, Self::Indexed)
    }
}

impl fmt::Display for IndexTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<IndexTierConfig> for IndexTier {
    fn from(tier: IndexTierConfig) -> Self {
        match tier {
            IndexTierConfig::Indexed => Self::Indexed,
            IndexTierConfig::Substring => Self::Substring,
        }
    }
}

/// Opens the configured index tier
///
/// # Arguments
///
/// * `config` - Index section of the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn IndexStore>)` - The opened store
/// * `Err(SumiError::IndexOpen)` - The index could not be opened; callers
///   treat this as fatal
pub fn open_store(config: &IndexConfig) -> Result<Box<dyn IndexStore>, SumiError> {
    open_with(config, false)
}

/// Opens an existing index for queries only
///
/// Used by commands that never write. The full-text tier takes no writer
/// lock, so this works while a crawl holds the index open.
pub fn open_store_read_only(config: &IndexConfig) -> Result<Box<dyn IndexStore>, SumiError> {
    open_with(config, true)
}

fn open_with(config: &IndexConfig, read_only: bool) -> Result<Box<dyn IndexStore>, SumiError> {
    let path = Path::new(&config.path);
    let tier = IndexTier::from(config.tier);

    let opened: StorageResult<Box<dyn IndexStore>> = match (tier, read_only) {
        (IndexTier::Indexed, false) => {
            FullTextIndex::open(path, config.writer_memory_bytes).map(boxed)
        }
        (IndexTier::Indexed, true) => FullTextIndex::open_read_only(path).map(boxed),
        (IndexTier::Substring, false) => SubstringIndex::open(path).map(boxed),
        (IndexTier::Substring, true) => SubstringIndex::open_read_only(path).map(boxed),
    };

    let store = opened.map_err(|e| SumiError::IndexOpen {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(path = %path.display(), tier = %tier, read_only, "Opened index");
    Ok(store)
}

fn boxed<S: IndexStore + 'static>(store: S) -> Box<dyn IndexStore> {
    Box::new(store)
}

/// Header every SQLite database file starts with
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Marker file of a tantivy index directory
const TANTIVY_META: &str = "meta.json";

/// Removes a previous index at the index location
///
/// Works for both a tantivy directory and a SQLite file (including its
/// `-wal` and `-shm` companions). A missing location is not an error.
///
/// Anything that does not look like an index is left alone: a non-empty
/// directory without `meta.json`, or a non-empty file without the SQLite
/// header, fails with [`io::ErrorKind::InvalidInput`].
pub fn reset_location(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        ensure_index_directory(path)?;
        std::fs::remove_dir_all(path)?;
    } else if path.exists() {
        ensure_sqlite_file(path)?;
        std::fs::remove_file(path)?;
    }

    for suffix in ["-wal", "-shm"] {
        let mut companion = path.as_os_str().to_owned();
        companion.push(suffix);
        let companion = Path::new(&companion);
        if companion.is_file() {
            std::fs::remove_file(companion)?;
        }
    }

    Ok(())
}

fn ensure_index_directory(path: &Path) -> io::Result<()> {
    let is_empty = std::fs::read_dir(path)?.next().is_none();
    if is_empty || path.join(TANTIVY_META).is_file() {
        return Ok(());
    }
    Err(not_an_index(path, "directory has no meta.json"))
}

fn ensure_sqlite_file(path: &Path) -> io::Result<()> {
    let mut file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(());
    }

    let mut header = [0u8; 16];
    match file.read_exact(&mut header) {
        Ok(()) if &header == SQLITE_HEADER => Ok(()),
        Ok(()) => Err(not_an_index(path, "file is not a SQLite database")),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(not_an_index(path, "file is not a SQLite database"))
        }
        Err(e) => Err(e),
    }
}

fn not_an_index(path: &Path, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("refusing to delete {}: {}", path.display(), reason),
    )
}
