//! Per-crawl dedup tables and the frozen crawl result
//!
//! `CrawlState` is owned by the crawl control loop and is the only place the
//! dedup tables and the outstanding-task count are mutated. Tasks never see it;
//! they hand their results back to the loop, which applies them here.

use crate::state::item::{Classification, Item, ItemId, ItemState};
use crate::url::dedup_key;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use url::Url;

/// How a discovered URL relates to the items already known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// The canonical URL is already registered
    Known(ItemId),

    /// A different spelling of an already registered page
    Alias(ItemId),

    /// Never seen before; a fresh item was registered
    New(ItemId),
}

impl Discovery {
    /// The item the discovered URL refers to
    pub fn id(&self) -> ItemId {
        match *self {
            Self::Known(id) | Self::Alias(id) | Self::New(id) => id,
        }
    }
}

/// Mutable state of one crawl
#[derive(Debug, Default)]
pub struct CrawlState {
    items: Vec<Item>,
    by_canonical: HashMap<String, ItemId>,
    by_stripped: HashMap<String, ItemId>,
    outstanding: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `url` in both dedup tables, registering a new item on a miss
    ///
    /// The canonical table is consulted first, then the alias table. Only a
    /// miss in both creates an item, which is then registered in both.
    pub fn discover(&mut self, url: Url, referrer: Option<&Url>) -> Discovery {
        if let Some(&id) = self.by_canonical.get(url.as_str()) {
            return Discovery::Known(id);
        }

        let stripped = dedup_key(&url);
        if let Some(&id) = self.by_stripped.get(&stripped) {
            return Discovery::Alias(id);
        }

        let id = ItemId(self.items.len());
        self.by_canonical.insert(url.as_str().to_string(), id);
        self.by_stripped.insert(stripped, id);
        self.items.push(Item::new(id, url, referrer.cloned()));

        Discovery::New(id)
    }

    /// Records that a task was dispatched for a queued item
    pub fn mark_dispatched(&mut self, id: ItemId) {
        let item = &mut self.items[id.0];
        debug_assert_eq!(item.state, ItemState::Queued, "item dispatched twice");
        item.state = ItemState::InFlight;
        self.outstanding += 1;
    }

    /// Applies a finished task's result and retires it from the outstanding count
    pub fn complete(&mut self, id: ItemId, classification: Classification, title: String) {
        let item = &mut self.items[id.0];
        debug_assert_eq!(item.state, ItemState::InFlight, "item completed twice");
        item.classification = classification;
        item.title = title;
        item.state = ItemState::Done;
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    /// Appends a reference to `child` to the children of `parent`
    pub fn add_child(&mut self, parent: ItemId, child: ItemId) {
        self.items[parent.0].children.push(child);
    }

    /// Number of dispatched tasks that have not completed yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    /// Number of distinct items registered so far
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items whose classification is final
    pub fn done(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state.is_terminal())
            .count()
    }

    /// Freezes the state into the crawl result
    pub fn into_graph(self, seed: ItemId, started_at: DateTime<Utc>) -> CrawlGraph {
        CrawlGraph {
            seed,
            items: self.items,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// The result of one crawl: every distinct item, once
///
/// Items are stored in discovery order; children refer back into the same
/// table, so a page referenced by many parents exists exactly once.
#[derive(Debug, Clone)]
pub struct CrawlGraph {
    seed: ItemId,
    items: Vec<Item>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl CrawlGraph {
    /// The seed item
    pub fn seed_item(&self) -> &Item {
        self.get(self.seed)
    }

    pub fn get(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    /// Finds an item by its canonical URL
    pub fn find(&self, url: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.url.as_str() == url)
    }

    /// All items, in discovery order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Resolves the children of `id` to the shared items they refer to
    pub fn children(&self, id: ItemId) -> impl Iterator<Item = &Item> + '_ {
        self.get(id).children.iter().map(move |child| self.get(*child))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of child references across all items
    pub fn edge_count(&self) -> usize {
        self.items.iter().map(|item| item.children.len()).sum()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_discover_new_then_known() {
        let mut state = CrawlState::new();
        let first = state.discover(url("http://example.com/a.html"), None);
        assert!(matches!(first, Discovery::New(_)));

        let again = state.discover(url("http://example.com/a.html"), None);
        assert_eq!(again, Discovery::Known(first.id()));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_discover_fragment_alias() {
        let mut state = CrawlState::new();
        let page = state.discover(url("http://example.com/page.html"), None);
        let alias = state.discover(url("http://example.com/page.html#section"), None);
        assert_eq!(alias, Discovery::Alias(page.id()));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_discover_index_alias() {
        let mut state = CrawlState::new();
        let dir = state.discover(url("http://example.com/dir/"), None);
        let index = state.discover(url("http://example.com/dir/index.html"), None);
        assert_eq!(index, Discovery::Alias(dir.id()));
    }

    #[test]
    fn test_discover_records_referrer() {
        let mut state = CrawlState::new();
        let parent = url("http://example.com/");
        let child = state.discover(url("http://example.com/x"), Some(&parent));
        assert_eq!(state.item(child.id()).referrer(), Some(&parent));
    }

    #[test]
    fn test_outstanding_lifecycle() {
        let mut state = CrawlState::new();
        let id = state.discover(url("http://example.com/"), None).id();
        assert_eq!(state.outstanding(), 0);

        state.mark_dispatched(id);
        assert_eq!(state.outstanding(), 1);
        assert_eq!(state.item(id).state(), ItemState::InFlight);

        state.complete(id, Classification::HtmlPage, "Home".to_string());
        assert_eq!(state.outstanding(), 0);
        assert_eq!(state.item(id).state(), ItemState::Done);
        assert_eq!(state.item(id).title(), "Home");
        assert_eq!(state.done(), 1);
    }

    #[test]
    fn test_graph_children_share_items() {
        let mut state = CrawlState::new();
        let a = state.discover(url("http://example.com/a"), None).id();
        let b = state.discover(url("http://example.com/b"), None).id();
        let c = state.discover(url("http://example.com/c"), None).id();
        state.add_child(a, c);
        state.add_child(b, c);

        let graph = state.into_graph(a, Utc::now());
        let from_a: Vec<ItemId> = graph.children(a).map(|item| item.id()).collect();
        let from_b: Vec<ItemId> = graph.children(b).map(|item| item.id()).collect();
        assert_eq!(from_a, vec![c]);
        assert_eq!(from_b, vec![c]);
        assert!(std::ptr::eq(
            graph.children(a).next().unwrap(),
            graph.children(b).next().unwrap()
        ));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.seed_item().url().as_str(), "http://example.com/a");
        assert!(graph.find("http://example.com/b").is_some());
        assert!(graph.find("http://example.com/zzz").is_none());
    }
}
