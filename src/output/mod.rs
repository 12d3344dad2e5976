//! Output module for crawl reports
//!
//! This module handles:
//! - The report a finished crawl produces
//! - Summary statistics derived from the results
//! - Sinks that print or export the report

mod console;
mod json;
pub mod stats;
mod traits;

pub use console::ConsoleSink;
pub use json::JsonSink;
pub use stats::CrawlSummary;
pub use traits::{CrawlReport, OutputError, OutputResult, ResultSink};
