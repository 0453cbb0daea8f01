//! Sitemap assembly
//!
//! Groups the flat item graph into one `Location` per HTML page, bucketing
//! each page's children by their classification.

use crate::state::{Classification, CrawlGraph, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Report entry for one HTML page
///
/// Every list is deduplicated and sorted. Empty lists serialize as `[]`,
/// never as a missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Title")]
    pub title: String,

    /// Children that are HTML pages
    #[serde(rename = "Links")]
    pub links: Vec<String>,

    /// Children that are non-HTML resources
    #[serde(rename = "Assets")]
    pub assets: Vec<String>,

    /// Children that failed, or never got a result
    #[serde(rename = "Broken")]
    pub broken: Vec<String>,

    /// Children on other hosts
    #[serde(rename = "Remote")]
    pub remote: Vec<String>,
}

#[derive(Default)]
struct Buckets {
    links: BTreeSet<String>,
    assets: BTreeSet<String>,
    broken: BTreeSet<String>,
    remote: BTreeSet<String>,
}

impl Buckets {
    fn add(&mut self, child: &Item) {
        let bucket = match child.classification() {
            Classification::HtmlPage => &mut self.links,
            Classification::Asset => &mut self.assets,
            Classification::Remote => &mut self.remote,
            Classification::Broken | Classification::Unknown => &mut self.broken,
        };
        bucket.insert(child.url().to_string());
    }
}

/// Builds the sitemap for a finished crawl
///
/// Emits one `Location` per item classified as an HTML page, sorted by URL.
/// Pure: no network access and no dependence on the order items were found.
pub fn assemble(graph: &CrawlGraph) -> Vec<Location> {
    let mut locations: Vec<Location> = graph
        .items()
        .iter()
        .filter(|item| item.classification().is_page())
        .map(|page| {
            let mut buckets = Buckets::default();
            for child in graph.children(page.id()) {
                buckets.add(child);
            }

            Location {
                url: page.url().to_string(),
                title: page.title().to_string(),
                links: buckets.links.into_iter().collect(),
                assets: buckets.assets.into_iter().collect(),
                broken: buckets.broken.into_iter().collect(),
                remote: buckets.remote.into_iter().collect(),
            }
        })
        .collect();

    locations.sort_by(|a, b| a.url.cmp(&b.url));
    locations
}
