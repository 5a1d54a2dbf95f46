/// Page lifecycle states during a crawl
///
/// A URL moves `Pending -> Visiting -> Visited` exactly once per run.
use std::fmt;

/// Represents where a URL stands in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// On the agenda, waiting to be popped
    Pending,

    /// Popped and marked visited; fetch and extraction in progress
    Visiting,

    /// Fully handled. Terminal, whether the page was stored or failed
    Visited,
}

impl PageState {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Visiting) | (Self::Visiting, Self::Visited)
        )
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Visiting => "visiting",
            Self::Visited => "visited",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
