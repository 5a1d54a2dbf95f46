//! SQLite substring index
//!
//! Degraded fallback tier: case-insensitive substring matching of any query
//! term against title or content. There is no ranking, every hit scores 1.0,
//! and fuzzy matching is not supported.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{IndexTier, PageRecord, ScoredRecord};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

/// Score assigned to every substring hit
pub const SUBSTRING_SCORE: f32 = 1.0;

/// SQLite-backed substring index
pub struct SubstringIndex {
    conn: Connection,
    read_only: bool,
}

impl SubstringIndex {
    /// Opens or creates the index file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file; parent directories are
    ///   created if missing
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            read_only: false,
        })
    }

    /// Opens an existing index file for queries only
    ///
    /// The file is neither created nor migrated. Upserts fail with
    /// [`StorageError::ReadOnly`].
    pub fn open_read_only(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(Self {
            conn,
            read_only: true,
        })
    }

    /// Creates an in-memory index (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            read_only: false,
        })
    }
}

impl IndexStore for SubstringIndex {
    fn upsert(&mut self, record: &PageRecord) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }

        let title = record.display_title();

        // ON CONFLICT keeps the row (and its seq) for a URL already present
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO pages (url, title, content, title_lower, content_lower)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                title_lower = excluded.title_lower,
                content_lower = excluded.content_lower",
            params![
                record.url,
                title,
                record.content,
                title.to_lowercase(),
                record.content.to_lowercase()
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn query(&self, terms: &[String], _fuzzy: bool) -> StorageResult<Vec<ScoredRecord>> {
        let needles: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if needles.is_empty() {
            return Ok(Vec::new());
        }

        let clause = needles
            .iter()
            .map(|_| "(instr(title_lower, ?) > 0 OR instr(content_lower, ?) > 0)")
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT url, title, content FROM pages WHERE {} ORDER BY seq ASC",
            clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(needles.iter().flat_map(|n| [n, n])),
            |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                })
            },
        )?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(ScoredRecord {
                record: row?,
                score: SUBSTRING_SCORE,
            });
        }

        Ok(hits)
    }

    fn get(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, title, content FROM pages WHERE url = ?1",
                params![url],
                |row| {
                    Ok(PageRecord {
                        url: row.get(0)?,
                        title: row.get(1)?,
                        content: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn tier(&self) -> IndexTier {
        IndexTier::Substring
    }

    fn close(self: Box<Self>) -> StorageResult<()> {
        let this = *self;
        this.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}
