//! URL handling module for Sitegraph
//!
//! This module canonicalizes discovered links, derives the alias key used to
//! recognize two spellings of the same page, and decides which URLs belong to
//! the crawled site.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, HostScope};
pub use normalize::{dedup_key, resolve};
