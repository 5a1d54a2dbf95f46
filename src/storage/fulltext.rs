//! Full-text index backed by tantivy
//!
//! This is the reference tier:
//! - English stemming analyzer on `title` and `content`
//! - BM25 term matches, title boosted 2.0 over content
//! - Optional fuzzy matches within one edit (transpositions count as one)
//! - Insert-or-replace by URL with a commit per upsert
//! - A read-only mode for serving queries without taking the writer lock

use crate::storage::schema::{build_schema, english_analyzer, IndexFields, ENGLISH_ANALYZER};
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{IndexTier, PageRecord, ScoredRecord};
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::{AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term,
};
use tracing::{debug, warn};

/// Boost applied to matches in the title field
pub const TITLE_BOOST: f32 = 2.0;

/// Boost applied to matches in the content field
pub const CONTENT_BOOST: f32 = 1.0;

/// Maximum edit distance for fuzzy terms
const FUZZY_DISTANCE: u8 = 1;

/// tantivy-backed page index
pub struct FullTextIndex {
    fields: IndexFields,
    analyzer: TextAnalyzer,
    /// `None` when opened read-only
    writer: Option<IndexWriter>,
    reader: IndexReader,
    next_seq: u64,
}

impl FullTextIndex {
    /// Opens or creates an index in the given directory
    ///
    /// # Arguments
    ///
    /// * `dir` - Index directory; created if missing
    /// * `writer_memory_bytes` - Memory budget for the single writer thread
    ///
    /// # Returns
    ///
    /// * `Ok(FullTextIndex)` - Ready for upserts and queries
    /// * `Err(StorageError)` - The directory or index could not be opened
    pub fn open(dir: &Path, writer_memory_bytes: usize) -> StorageResult<Self> {
        std::fs::create_dir_all(dir)?;

        let (schema, fields) = build_schema();
        let directory = MmapDirectory::open(dir).map_err(tantivy::TantivyError::from)?;
        let index = Index::open_or_create(directory, schema)?;

        let analyzer = register_analyzer(&index);
        let writer: IndexWriter = index.writer_with_num_threads(1, writer_memory_bytes)?;

        Self::assemble(&index, fields, analyzer, Some(writer), dir)
    }

    /// Opens an existing index for queries only
    ///
    /// No writer is created, so the writer lock is left free and no indexing
    /// memory is reserved. Upserts fail with [`StorageError::ReadOnly`].
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory of an index previously built by [`open`](Self::open)
    pub fn open_read_only(dir: &Path) -> StorageResult<Self> {
        let (_, fields) = build_schema();
        let directory = MmapDirectory::open(dir).map_err(tantivy::TantivyError::from)?;
        let index = Index::open(directory)?;

        let analyzer = register_analyzer(&index);
        Self::assemble(&index, fields, analyzer, None, dir)
    }

    fn assemble(
        index: &Index,
        fields: IndexFields,
        analyzer: TextAnalyzer,
        writer: Option<IndexWriter>,
        dir: &Path,
    ) -> StorageResult<Self> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        let mut store = Self {
            fields,
            analyzer,
            writer,
            reader,
            next_seq: 0,
        };
        store.next_seq = store.max_seq()?.map_or(0, |s| s + 1);

        debug!(
            dir = %dir.display(),
            next_seq = store.next_seq,
            read_only = store.writer.is_none(),
            "Opened full-text index"
        );
        Ok(store)
    }

    /// Highest insertion sequence currently stored, if any
    fn max_seq(&self) -> StorageResult<Option<u64>> {
        let searcher = self.reader.searcher();
        let total = searcher.num_docs() as usize;
        if total == 0 {
            return Ok(None);
        }

        let mut max = None;
        for (_, address) in searcher.search(&AllQuery, &TopDocs::with_limit(total))? {
            let seq = self.seq_of(&searcher, address)?;
            max = Some(max.map_or(seq, |m: u64| m.max(seq)));
        }
        Ok(max)
    }

    fn url_term(&self, url: &str) -> Term {
        Term::from_field_text(self.fields.url, url)
    }

    /// Finds the stored document for a URL
    fn find(&self, searcher: &Searcher, url: &str) -> StorageResult<Option<DocAddress>> {
        if searcher.num_docs() == 0 {
            return Ok(None);
        }
        let query = TermQuery::new(self.url_term(url), IndexRecordOption::Basic);
        let hits = searcher.search(&query, &TopDocs::with_limit(1))?;
        Ok(hits.first().map(|(_, address)| *address))
    }

    fn seq_of(&self, searcher: &Searcher, address: DocAddress) -> StorageResult<u64> {
        let doc: TantivyDocument = searcher.doc(address)?;
        doc.get_first(self.fields.seq)
            .and_then(|v| v.as_u64())
            .ok_or(StorageError::MissingField("seq"))
    }

    fn load(&self, searcher: &Searcher, address: DocAddress) -> StorageResult<(PageRecord, u64)> {
        let doc: TantivyDocument = searcher.doc(address)?;
        let text = |field: Field, name: &'static str| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or(StorageError::MissingField(name))
        };

        let record = PageRecord {
            url: text(self.fields.url, "url")?,
            title: text(self.fields.title, "title")?,
            content: text(self.fields.content, "content")?,
        };
        let seq = doc
            .get_first(self.fields.seq)
            .and_then(|v| v.as_u64())
            .ok_or(StorageError::MissingField("seq"))?;

        Ok((record, seq))
    }

    /// Runs raw query words through the field analyzer
    fn analyze(&self, terms: &[String]) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut tokens = Vec::new();
        for term in terms {
            let mut stream = analyzer.token_stream(term);
            stream.process(&mut |token| tokens.push(token.text.clone()));
        }
        tokens.sort();
        tokens.dedup();
        tokens
    }

    fn build_query(&self, tokens: &[String], fuzzy: bool) -> BooleanQuery {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for token in tokens {
            for (field, boost) in [
                (self.fields.title, TITLE_BOOST),
                (self.fields.content, CONTENT_BOOST),
            ] {
                let term = Term::from_field_text(field, token);

                let exact: Box<dyn Query> =
                    Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));
                clauses.push((Occur::Should, Box::new(BoostQuery::new(exact, boost))));

                if fuzzy {
                    let near: Box<dyn Query> =
                        Box::new(FuzzyTermQuery::new(term, FUZZY_DISTANCE, true));
                    clauses.push((Occur::Should, Box::new(BoostQuery::new(near, boost))));
                }
            }
        }

        BooleanQuery::new(clauses)
    }

    fn document(&self, record: &PageRecord, seq: u64) -> TantivyDocument {
        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.url, &record.url);
        doc.add_text(self.fields.title, record.display_title());
        doc.add_text(self.fields.content, &record.content);
        doc.add_u64(self.fields.seq, seq);
        doc
    }
}

/// Registers the English analyzer on the index and returns a copy for queries
fn register_analyzer(index: &Index) -> TextAnalyzer {
    let analyzer = english_analyzer();
    index.tokenizers().register(ENGLISH_ANALYZER, analyzer.clone());
    analyzer
}

/// Replaces any document with the same URL and commits
fn replace(writer: &mut IndexWriter, url_term: Term, doc: TantivyDocument) -> tantivy::Result<()> {
    writer.delete_term(url_term);
    writer.add_document(doc)?;
    writer.commit()?;
    Ok(())
}

impl IndexStore for FullTextIndex {
    fn upsert(&mut self, record: &PageRecord) -> StorageResult<()> {
        let searcher = self.reader.searcher();
        let existing = match self.find(&searcher, &record.url)? {
            Some(address) => Some(self.seq_of(&searcher, address)?),
            None => None,
        };
        let seq = existing.unwrap_or(self.next_seq);

        let doc = self.document(record, seq);
        let url_term = self.url_term(&record.url);
        let Some(writer) = self.writer.as_mut() else {
            return Err(StorageError::ReadOnly);
        };

        if let Err(e) = replace(writer, url_term, doc) {
            if let Err(rollback) = writer.rollback() {
                warn!(url = %record.url, error = %rollback, "Index rollback failed");
            }
            return Err(e.into());
        }

        self.reader.reload()?;
        if existing.is_none() {
            self.next_seq += 1;
        }
        Ok(())
    }

    fn query(&self, terms: &[String], fuzzy: bool) -> StorageResult<Vec<ScoredRecord>> {
        let tokens = self.analyze(terms);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let total = searcher.num_docs() as usize;
        if total == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(&tokens, fuzzy);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(total))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let (record, seq) = self.load(&searcher, address)?;
            hits.push((ScoredRecord { record, score }, seq));
        }

        hits.sort_by(|(a, a_seq), (b, b_seq)| {
            b.score.total_cmp(&a.score).then(a_seq.cmp(b_seq))
        });

        Ok(hits.into_iter().map(|(hit, _)| hit).collect())
    }

    fn get(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let searcher = self.reader.searcher();
        match self.find(&searcher, url)? {
            Some(address) => Ok(Some(self.load(&searcher, address)?.0)),
            None => Ok(None),
        }
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(self.reader.searcher().num_docs())
    }

    fn tier(&self) -> IndexTier {
        IndexTier::Indexed
    }

    fn close(self: Box<Self>) -> StorageResult<()> {
        let this = *self;
        if let Some(writer) = this.writer {
            writer.wait_merging_threads()?;
        }
        Ok(())
    }
}
