//! Statistics generation from a finished crawl
//!
//! This module counts items by classification and writes a short summary.
//! The summary goes to a caller-supplied writer so that stdout can stay
//! reserved for the report itself.

use crate::state::{Classification, CrawlGraph};
use std::collections::HashMap;
use std::io::{self, Write};

/// Every classification, in reporting order
const CLASSIFICATIONS: [Classification; 5] = [
    Classification::HtmlPage,
    Classification::Asset,
    Classification::Remote,
    Classification::Broken,
    Classification::Unknown,
];

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Seed URL of the crawl
    pub seed: String,

    /// Total number of distinct items discovered
    pub total_items: u64,

    /// Count of items by classification
    pub items_by_classification: HashMap<Classification, u64>,

    /// Total number of child references
    pub total_links: u64,

    /// Wall-clock duration of the crawl in milliseconds
    pub duration_ms: i64,
}

impl CrawlStatistics {
    /// Computes statistics for a finished crawl
    pub fn from_graph(graph: &CrawlGraph) -> Self {
        let mut items_by_classification = HashMap::new();
        for item in graph.items() {
            *items_by_classification
                .entry(item.classification())
                .or_insert(0) += 1;
        }

        Self {
            seed: graph.seed_item().url().to_string(),
            total_items: graph.len() as u64,
            items_by_classification,
            total_links: graph.edge_count() as u64,
            duration_ms: graph.duration().num_milliseconds(),
        }
    }

    /// Number of items with the given classification
    pub fn count(&self, classification: Classification) -> u64 {
        self.items_by_classification
            .get(&classification)
            .copied()
            .unwrap_or(0)
    }

    /// Percentage of in-scope items that ended up broken or unknown
    pub fn broken_rate(&self) -> f64 {
        let in_scope = self.total_items - self.count(Classification::Remote);
        if in_scope == 0 {
            return 0.0;
        }
        let broken = self.count(Classification::Broken) + self.count(Classification::Unknown);
        (broken as f64 / in_scope as f64) * 100.0
    }

    /// Classification counts in reporting order, skipping zeros
    pub fn breakdown(&self) -> Vec<(Classification, u64)> {
        CLASSIFICATIONS
            .iter()
            .map(|c| (*c, self.count(*c)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Writes statistics in a human-readable form
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `out` - Where to write them (the binary passes stderr)
pub fn write_statistics(stats: &CrawlStatistics, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "=== Crawl Statistics: {} ===", stats.seed)?;
    writeln!(out, "  Total items: {}", stats.total_items)?;
    writeln!(out, "  Total links: {}", stats.total_links)?;
    writeln!(out, "  Duration: {:.2}s", stats.duration_ms as f64 / 1000.0)?;

    for (classification, count) in stats.breakdown() {
        let percentage = if stats.total_items > 0 {
            (count as f64 / stats.total_items as f64) * 100.0
        } else {
            0.0
        };
        writeln!(out, "  {}: {} ({:.1}%)", classification, count, percentage)?;
    }

    writeln!(out, "  Broken rate: {:.1}%", stats.broken_rate())
}
