//! Configuration module for Sitegraph
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use sitegraph::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitegraph.toml")).unwrap();
//! println!("Fetching at most {} pages at once", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
