//! Configuration module for LinkSweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linksweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linksweep.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckerConfig, Config, CrawlConfig, UserAgentConfig, DEFAULT_IGNORE_PATTERNS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
