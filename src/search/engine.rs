//! Query engine over an [`IndexStore`]
//!
//! Splits the query on whitespace, asks the store for every match, keeps the
//! store's ordering, and turns each hit into a [`SearchResult`] with a
//! highlighted title and excerpt.

use crate::search::highlight::{excerpt, highlight};
use crate::search::types::SearchResult;
use crate::storage::{IndexStore, StorageResult};
use tracing::{debug, error};

/// Default excerpt window
pub const DEFAULT_CONTEXT_CHARS: usize = 200;

/// Default result cap
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Read-only search front for a store
pub struct QueryEngine<'a> {
    store: &'a dyn IndexStore,
    context_chars: usize,
}

impl<'a> QueryEngine<'a> {
    /// Creates an engine with the default excerpt window
    pub fn new(store: &'a dyn IndexStore) -> Self {
        Self {
            store,
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }

    /// Overrides the excerpt window width
    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    /// Searches the index, never surfacing an error
    ///
    /// A store failure is logged and reported as no results. Use
    /// [`try_search`](Self::try_search) to see the error.
    ///
    /// # Arguments
    ///
    /// * `query` - Free text; whitespace separates terms
    /// * `fuzzy` - Also match terms within one edit, where the tier supports it
    /// * `max_results` - Cap on the number of results
    ///
    /// # Returns
    ///
    /// Results in descending score order, ties in insertion order.
    pub fn search(&self, query: &str, fuzzy: bool, max_results: usize) -> Vec<SearchResult> {
        match self.try_search(query, fuzzy, max_results) {
            Ok(results) => results,
            Err(e) => {
                error!(query = %query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Searches the index and reports store failures
    pub fn try_search(
        &self,
        query: &str,
        fuzzy: bool,
        max_results: usize,
    ) -> StorageResult<Vec<SearchResult>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let tier = self.store.tier();
        let fuzzy = fuzzy && tier.supports_fuzzy();

        let hits = self.store.query(&terms, fuzzy)?;
        debug!(
            query = %query,
            tier = %tier,
            fuzzy,
            hits = hits.len(),
            "Query executed"
        );

        Ok(hits
            .into_iter()
            .take(max_results)
            .map(|hit| SearchResult {
                title: highlight(hit.record.display_title(), &terms),
                excerpt: excerpt(&hit.record.content, &terms, self.context_chars),
                url: hit.record.url,
                score: hit.score,
            })
            .collect())
    }
}
