use crate::UrlError;
use std::fmt;
use url::Url;

/// An absolute URL with its fragment removed
///
/// Two links that differ only by `#fragment` produce the same `NormalizedUrl`,
/// which is what the frontier keys its visited set on and what the index keys
/// its records on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Returns the URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a URL by stripping its fragment
///
/// The URL is parsed, so the result is the canonical serialization of the
/// `url` crate (lowercased scheme and host, default port dropped, empty path
/// becoming `/`). Fragment removal is the only rewrite on top of that.
///
/// # Arguments
///
/// * `url_str` - An absolute URL
///
/// # Returns
///
/// * `Ok(NormalizedUrl)` - The fragment-free URL
/// * `Err(UrlError::Parse)` - The input is not an absolute URL
///
/// # Examples
///
/// ```
/// use sumi_sieve::url::normalize;
///
/// let a = normalize("https://example.com/guide#install").unwrap();
/// let b = normalize("https://example.com/guide").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn normalize(url_str: &str) -> Result<NormalizedUrl, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;
    Ok(from_url(url))
}

/// Resolves a link found on a page against that page's URL
///
/// Absolute hrefs pass through unchanged, scheme-relative and path-relative
/// hrefs are joined against `base`. The result is normalized.
///
/// # Arguments
///
/// * `base` - URL of the page the link was found on
/// * `href` - Raw `href` attribute value
pub fn resolve(base: &str, href: &str) -> Result<NormalizedUrl, UrlError> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let joined = base_url.join(href.trim()).map_err(|e| UrlError::Resolve {
        base: base.to_string(),
        href: href.to_string(),
        reason: e.to_string(),
    })?;
    Ok(from_url(joined))
}

fn from_url(mut url: Url) -> NormalizedUrl {
    url.set_fragment(None);
    NormalizedUrl(url.into())
}
