//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::storage::{IndexTier, PageRecord, ScoredRecord};
use thiserror::Error;

/// Errors that can occur during index operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Full-text index error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Index was opened read-only")]
    ReadOnly,

    #[error("Stored document is missing field '{0}'")]
    MissingField(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page index implementations
///
/// The crawler writes through `&mut dyn IndexStore` and the query engine
/// reads through `&dyn IndexStore`. The two phases never share a store.
pub trait IndexStore {
    /// Inserts a record, replacing any existing record with the same URL
    ///
    /// The write is atomic: if it fails, the previous record (if any) is
    /// still the one returned by [`get`](Self::get) and [`query`](Self::query).
    fn upsert(&mut self, record: &PageRecord) -> StorageResult<()>;

    /// Finds every record matching any of the query terms
    ///
    /// # Arguments
    ///
    /// * `terms` - Raw query words, already split on whitespace
    /// * `fuzzy` - Also accept terms within one edit (ignored by tiers
    ///   without fuzzy support)
    ///
    /// # Returns
    ///
    /// All matches ordered by descending score. Equal scores keep the order
    /// in which the URLs were first inserted.
    fn query(&self, terms: &[String], fuzzy: bool) -> StorageResult<Vec<ScoredRecord>>;

    /// Looks up a single record by its URL
    fn get(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Number of records in the index
    fn count(&self) -> StorageResult<u64>;

    /// Which implementation backs this store
    fn tier(&self) -> IndexTier;

    /// Flushes and releases the store
    fn close(self: Box<Self>) -> StorageResult<()>;
}
