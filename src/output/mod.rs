//! Output module for crawl reports
//!
//! This module handles:
//! - Assembling the per-page sitemap from a finished crawl
//! - Rendering it as JSON or markdown
//! - Computing and printing crawl statistics

mod json;
mod markdown;
mod sitemap;
pub mod stats;

pub use json::to_json;
pub use markdown::to_markdown;
pub use sitemap::{assemble, Location};
pub use stats::{write_statistics, CrawlStatistics};
