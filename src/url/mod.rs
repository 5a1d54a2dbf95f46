//! URL handling module for Sumi-Sieve
//!
//! This module provides:
//! - Fragment-stripping normalization into [`NormalizedUrl`]
//! - Resolution of page-relative links
//! - The domain scope test used by the frontier

mod normalize;
mod scope;

pub use normalize::{normalize, resolve, NormalizedUrl};
pub use scope::in_scope;
