//! Rendering of search results

use crate::search::SearchResult;

/// Prints ranked results to stdout, one block per hit
///
/// Titles and excerpts are printed as produced by the query engine, with
/// their `<mark>` tags and HTML escapes intact.
pub fn print_results(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results for \"{}\"", query);
        return;
    }

    println!("{} result(s) for \"{}\"\n", results.len(), query);
    for (rank, result) in results.iter().enumerate() {
        println!("{}. {} [{:.3}]", rank + 1, result.title, result.score);
        println!("   {}", result.url);
        println!("   {}", result.excerpt);
        println!();
    }
}

/// Serializes results as a pretty-printed JSON array
pub fn results_to_json(results: &[SearchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
