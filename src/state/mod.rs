//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Item`: One discovered resource and its classification
//! - `CrawlState`: The dedup tables and outstanding count owned by the crawl loop
//! - `CrawlGraph`: The frozen result handed back once a crawl completes

mod crawl_state;
mod item;

// Re-export main types
pub use crawl_state::{CrawlGraph, CrawlState, Discovery};
pub use item::{Classification, Item, ItemId, ItemState};
