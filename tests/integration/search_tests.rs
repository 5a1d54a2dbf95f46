//! Integration tests for indexing and querying
//!
//! Pages are written straight into each index tier and queried through the
//! public query engine.

use sumi_sieve::config::{IndexConfig, IndexTierConfig, MIN_WRITER_MEMORY};
use sumi_sieve::search::QueryEngine;
use sumi_sieve::storage::{open_store, open_store_read_only, IndexStore, IndexTier, StorageError};
use sumi_sieve::PageRecord;
use tempfile::TempDir;

const GUIDE_URL: &str = "https://whoosh.readthedocs.io/en/latest/guide.html";

fn create_test_config(temp: &TempDir, tier: IndexTierConfig) -> IndexConfig {
    let name = match tier {
        IndexTierConfig::Indexed => "index",
        IndexTierConfig::Substring => "pages.db",
    };
    IndexConfig {
        path: temp.path().join(name).to_string_lossy().into_owned(),
        tier,
        writer_memory_bytes: MIN_WRITER_MEMORY,
    }
}

fn create_test_index(temp: &TempDir, tier: IndexTierConfig) -> Box<dyn IndexStore> {
    open_store(&create_test_config(temp, tier)).expect("Failed to open index")
}

fn page(url: &str, title: &str, content: &str) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        title: title.to_string(),
        content: content.to_string(),
    }
}

fn whoosh_guide() -> PageRecord {
    page(
        GUIDE_URL,
        "Whoosh Guide",
        "This is a guide about searching with egg and mammal examples.",
    )
}

#[test]
fn test_guide_egg_scenario() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);
    store.upsert(&whoosh_guide()).unwrap();

    let engine = QueryEngine::new(store.as_ref());
    let results = engine.search("egg", true, 20);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, GUIDE_URL);
    assert_eq!(results[0].title, "Whoosh Guide");
    assert!(results[0].excerpt.contains("<mark>egg</mark>"));
    assert!(results[0].score > 0.0);

    let exact = engine.search("egg", false, 20);
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].url, GUIDE_URL);
    assert!(exact[0].excerpt.contains("<mark>egg</mark>"));
}

#[test]
fn test_fuzzy_term_on_indexed_tier() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);
    store.upsert(&whoosh_guide()).unwrap();

    let engine = QueryEngine::new(store.as_ref());
    let fuzzy = engine.search("eeg", true, 20);
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].url, GUIDE_URL);

    assert!(engine.search("eeg", false, 20).is_empty());
}

#[test]
fn test_fuzzy_term_ignored_on_substring_fallback() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Substring);
    assert_eq!(store.tier(), IndexTier::Substring);
    store.upsert(&whoosh_guide()).unwrap();

    let engine = QueryEngine::new(store.as_ref());
    assert!(engine.search("eeg", true, 20).is_empty());

    let exact = engine.search("egg", true, 20);
    assert_eq!(exact.len(), 1);
    assert!(exact[0].excerpt.contains("<mark>egg</mark>"));
}

#[test]
fn test_stemming_matches_other_word_forms() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);
    store.upsert(&whoosh_guide()).unwrap();

    let results = QueryEngine::new(store.as_ref()).search("searches", false, 20);
    assert_eq!(results.len(), 1);
}

#[test]
fn test_upsert_is_idempotent_on_both_tiers() {
    for tier in [IndexTierConfig::Indexed, IndexTierConfig::Substring] {
        let temp = TempDir::new().unwrap();
        let mut store = create_test_index(&temp, tier);

        store.upsert(&whoosh_guide()).unwrap();
        store.upsert(&whoosh_guide()).unwrap();
        assert_eq!(store.count().unwrap(), 1, "tier {:?}", tier);

        let updated = page(GUIDE_URL, "Whoosh Guide", "Rewritten text about owls.");
        store.upsert(&updated).unwrap();
        assert_eq!(store.count().unwrap(), 1, "tier {:?}", tier);
        assert_eq!(store.get(GUIDE_URL).unwrap(), Some(updated));

        let engine = QueryEngine::new(store.as_ref());
        assert!(engine.search("egg", false, 20).is_empty(), "tier {:?}", tier);
        assert_eq!(engine.search("owls", false, 20).len(), 1, "tier {:?}", tier);
    }
}

#[test]
fn test_scores_are_non_increasing() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);

    store
        .upsert(&page(
            "https://example.com/content-once",
            "Birds",
            "Some birds lay an egg in spring.",
        ))
        .unwrap();
    store
        .upsert(&page(
            "https://example.com/title",
            "Egg Recipes",
            "Boil, fry or poach an egg.",
        ))
        .unwrap();
    store
        .upsert(&page(
            "https://example.com/unrelated",
            "Mammals",
            "Mammals do not usually lay anything.",
        ))
        .unwrap();

    let results = QueryEngine::new(store.as_ref()).search("egg", true, 20);
    assert_eq!(results.len(), 2);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    // Title matches are boosted above content-only matches
    assert_eq!(results[0].url, "https://example.com/title");
}

#[test]
fn test_max_results_caps_output() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);
    for i in 0..5 {
        store
            .upsert(&page(
                &format!("https://example.com/{}", i),
                &format!("Page {}", i),
                "egg",
            ))
            .unwrap();
    }

    let engine = QueryEngine::new(store.as_ref());
    assert_eq!(engine.search("egg", true, 3).len(), 3);
    assert_eq!(engine.search("egg", true, 20).len(), 5);
}

#[test]
fn test_empty_and_whitespace_queries() {
    for tier in [IndexTierConfig::Indexed, IndexTierConfig::Substring] {
        let temp = TempDir::new().unwrap();
        let mut store = create_test_index(&temp, tier);
        store.upsert(&whoosh_guide()).unwrap();

        let engine = QueryEngine::new(store.as_ref());
        assert!(engine.search("", true, 20).is_empty());
        assert!(engine.search("  \t \n ", true, 20).is_empty());
    }
}

#[test]
fn test_results_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Indexed);
    store.upsert(&whoosh_guide()).unwrap();
    store.close().unwrap();

    let store = create_test_index(&temp, IndexTierConfig::Indexed);
    assert_eq!(store.count().unwrap(), 1);
    let results = QueryEngine::new(store.as_ref()).search("mammal", true, 20);
    assert_eq!(results.len(), 1);
    assert!(results[0].excerpt.contains("<mark>mammal</mark>"));
}

#[test]
fn test_highlighting_escapes_stored_markup() {
    let temp = TempDir::new().unwrap();
    let mut store = create_test_index(&temp, IndexTierConfig::Substring);
    store
        .upsert(&page(
            "https://example.com/code",
            "Tags & <b>egg</b>",
            "Use <egg> & friends",
        ))
        .unwrap();

    let results = QueryEngine::new(store.as_ref()).search("egg", false, 20);
    assert_eq!(results[0].title, "Tags &amp; &lt;b&gt;<mark>egg</mark>&lt;/b&gt;");
    assert_eq!(results[0].excerpt, "Use &lt;<mark>egg</mark>&gt; &amp; friends");
}

#[test]
fn test_read_only_store_queries_while_writer_is_open() {
    for tier in [IndexTierConfig::Indexed, IndexTierConfig::Substring] {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp, tier);
        let mut writer = open_store(&config).unwrap();
        writer.upsert(&whoosh_guide()).unwrap();

        let mut reader = open_store_read_only(&config).unwrap();
        assert_eq!(reader.count().unwrap(), 1, "tier {:?}", tier);
        let results = QueryEngine::new(reader.as_ref()).search("egg", false, 20);
        assert_eq!(results.len(), 1, "tier {:?}", tier);

        let rejected = reader.upsert(&page("https://example.com/new", "New", "text"));
        assert!(matches!(rejected, Err(StorageError::ReadOnly)), "tier {:?}", tier);

        reader.close().unwrap();
        writer.close().unwrap();
    }
}

#[test]
fn test_read_only_store_requires_existing_index() {
    for tier in [IndexTierConfig::Indexed, IndexTierConfig::Substring] {
        let temp = TempDir::new().unwrap();
        let config = create_test_config(&temp, tier);
        assert!(open_store_read_only(&config).is_err(), "tier {:?}", tier);
        assert!(!std::path::Path::new(&config.path).exists(), "tier {:?}", tier);
    }
}
