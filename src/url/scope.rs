/// Checks whether a URL falls inside the crawl domain
///
/// This is a literal string prefix test. It does not look at URL structure,
/// so a prefix of `https://example.com` also admits
/// `https://example.com.evil.org/`. Configure the prefix with a trailing
/// slash to avoid that.
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::in_scope;
///
/// assert!(in_scope("https://example.com/docs/a", "https://example.com/docs/"));
/// assert!(!in_scope("https://other.org/", "https://example.com/"));
/// ```
pub fn in_scope(url: &str, domain_prefix: &str) -> bool {
    url.starts_with(domain_prefix)
}
