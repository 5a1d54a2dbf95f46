//! Crawl frontier: the visited set and the pending agenda
//!
//! The agenda is a stack, so the crawl runs depth first and the last link
//! discovered on a page is the next one visited. Each URL moves through
//! [`PageState`] `Pending -> Visiting -> Visited`; at most one URL is
//! `Visiting` at a time.

use crate::state::PageState;
use crate::url::NormalizedUrl;
use std::collections::HashSet;
use tracing::debug;

/// Visited set plus LIFO agenda, owned by a single coordinator
#[derive(Debug, Default)]
pub struct Frontier {
    agenda: Vec<NormalizedUrl>,
    /// Mirrors `agenda` for constant-time membership checks
    pending: HashSet<NormalizedUrl>,
    /// Every popped URL, including the one currently visiting
    visited: HashSet<NormalizedUrl>,
    visiting: Option<NormalizedUrl>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn with_seed(seed: NormalizedUrl) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed);
        frontier
    }

    /// Adds a URL to the agenda
    ///
    /// # Returns
    ///
    /// `true` if the URL was pushed, `false` if it is already visited or
    /// already pending.
    pub fn push(&mut self, url: NormalizedUrl) -> bool {
        if self.visited.contains(&url) || self.pending.contains(&url) {
            return false;
        }
        self.pending.insert(url.clone());
        self.agenda.push(url);
        true
    }

    /// Pops the next URL and moves it from `Pending` to `Visiting`
    ///
    /// The URL joins the visited set immediately, so links back to it are
    /// never enqueued. A URL still `Visiting` from the previous pop is
    /// finished first. Returns `None` once the agenda is exhausted.
    pub fn pop(&mut self) -> Option<NormalizedUrl> {
        if let Some(previous) = self.visiting.clone() {
            self.finish(&previous);
        }

        while let Some(url) = self.agenda.pop() {
            self.pending.remove(&url);
            if !self.visited.insert(url.clone()) {
                continue;
            }
            debug!(url = %url, from = %PageState::Pending, to = %PageState::Visiting, "Page state");
            self.visiting = Some(url.clone());
            return Some(url);
        }
        None
    }

    /// Moves the URL being visited to `Visited`
    ///
    /// # Returns
    ///
    /// `true` if `url` was `Visiting`, `false` if that step is not legal for
    /// it (unknown, pending or already visited).
    pub fn finish(&mut self, url: &NormalizedUrl) -> bool {
        let legal = self
            .state_of(url)
            .map_or(false, |state| state.can_transition_to(PageState::Visited));
        if legal {
            self.visiting = None;
            debug!(url = %url, from = %PageState::Visiting, to = %PageState::Visited, "Page state");
        }
        legal
    }

    /// Where a URL stands, or `None` if the frontier has never seen it
    pub fn state_of(&self, url: &NormalizedUrl) -> Option<PageState> {
        if self.visiting.as_ref() == Some(url) {
            Some(PageState::Visiting)
        } else if self.visited.contains(url) {
            Some(PageState::Visited)
        } else if self.pending.contains(url) {
            Some(PageState::Pending)
        } else {
            None
        }
    }

    /// Number of URLs waiting on the agenda
    pub fn pending_len(&self) -> usize {
        self.agenda.len()
    }

    /// Number of URLs popped so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// URLs popped so far, in no particular order
    pub fn visited(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.visited.iter()
    }
}
