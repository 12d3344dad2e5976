//! State tracking for a crawl
//!
//! This module contains the per-crawl visited set and the per-link result
//! records the crawl produces.

mod link_result;
mod visited;

pub use link_result::{LinkResult, LinkType};
pub use visited::VisitedSet;
