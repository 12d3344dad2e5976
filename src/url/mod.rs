//! URL handling module for LinkSweep
//!
//! This module provides URL normalization for the visited set, host
//! comparison for internal/external classification, and the exclusion rules
//! that keep links out of a crawl.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_host};
pub use matcher::ExclusionRules;
pub use normalize::normalize_url;
