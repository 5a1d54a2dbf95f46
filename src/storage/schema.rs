//! Schema definitions for both index tiers
//!
//! - SQL schema for the substring tier
//! - tantivy schema and English analyzer for the indexed tier

use tantivy::schema::{
    Field, IndexRecordOption, NumericOptions, Schema, TextFieldIndexing, TextOptions, STORED,
    STRING,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer,
};

/// SQL schema for the substring tier
///
/// The `*_lower` columns hold Unicode-lowercased copies so that matching does
/// not depend on SQLite's ASCII-only `lower()`.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    title_lower TEXT NOT NULL,
    content_lower TEXT NOT NULL
);
"#;

/// Initializes the SQL schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Name the English analyzer is registered under in the tantivy index
pub const ENGLISH_ANALYZER: &str = "sieve_en_stem";

/// Tokens longer than this are dropped before indexing
const MAX_TOKEN_LEN: usize = 40;

/// Builds the analyzer used for `title` and `content`
///
/// Simple tokenizer, long-token filter, lowercase, Porter (English) stemmer.
pub fn english_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(Stemmer::new(Language::English))
        .build()
}

/// Field handles for the full-text schema
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub url: Field,
    pub title: Field,
    pub content: Field,
    pub seq: Field,
}

/// Builds the full-text schema
///
/// `url` is a raw stored key, `title` and `content` are analyzed with
/// positions, `seq` records first-insertion order for tie-breaking.
pub fn build_schema() -> (Schema, IndexFields) {
    let mut builder = Schema::builder();

    let text_options = TextOptions::default().set_stored().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(ENGLISH_ANALYZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );

    let url = builder.add_text_field("url", STRING | STORED);
    let title = builder.add_text_field("title", text_options.clone());
    let content = builder.add_text_field("content", text_options);
    let seq = builder.add_u64_field("seq", NumericOptions::default().set_stored().set_indexed());

    (
        builder.build(),
        IndexFields {
            url,
            title,
            content,
            seq,
        },
    )
}
