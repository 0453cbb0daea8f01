//! Crawler module for site traversal
//!
//! This module contains the core crawling logic, including:
//! - Probing and fetching items over HTTP
//! - Scanning HTML for a title and link-like attributes
//! - Overall crawl coordination and completion detection

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{
    build_http_client, is_html, probe_and_fetch, BodyResponse, FetchResult, Fetcher,
    HeadResponse, HttpFetcher,
};
pub use parser::{parse_html, ParsedPage};
