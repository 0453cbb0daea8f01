/// Item definitions for tracking discovered resources
///
/// This module defines the item record kept for every distinct canonical URL,
/// its terminal classification and its lifecycle state.
use std::fmt;
use url::Url;

/// Handle to an item in a crawl's item table
///
/// Children are stored as handles, so every parent linking to a page refers
/// to the one shared item for that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

/// Terminal category of a discovered resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// No definitive result was produced
    #[default]
    Unknown,

    /// Fetched and served as `text/html`
    HtmlPage,

    /// Reachable, but not HTML; never downloaded
    Asset,

    /// On another host; never fetched
    Remote,

    /// Probe or fetch failed, or returned a non-success status
    Broken,
}

impl Classification {
    /// Returns true if this is the result of a successful page fetch
    pub fn is_page(&self) -> bool {
        matches!(self, Self::HtmlPage)
    }

    /// Returns true if the item should be reported as broken
    ///
    /// Unknown counts as broken since it signals a crawl that never finished
    /// for this item.
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Broken | Self::Unknown)
    }

    /// Short lowercase label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::HtmlPage => "page",
            Self::Asset => "asset",
            Self::Remote => "remote",
            Self::Broken => "broken",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of an item within a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    /// Discovered and canonicalized, not yet dispatched
    Queued,

    /// A task is probing/fetching the item
    InFlight,

    /// Classification is final and children (if any) are linked
    Done,
}

impl ItemState {
    /// Returns true if the item has reached its final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// One discovered resource
#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) url: Url,
    pub(crate) referrer: Option<Url>,
    pub(crate) title: String,
    pub(crate) classification: Classification,
    pub(crate) state: ItemState,
    pub(crate) children: Vec<ItemId>,
}

impl Item {
    pub(crate) fn new(id: ItemId, url: Url, referrer: Option<Url>) -> Self {
        Self {
            id,
            url,
            referrer,
            title: String::new(),
            classification: Classification::Unknown,
            state: ItemState::Queued,
            children: Vec::new(),
        }
    }

    /// Handle of this item
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Canonical URL, unique across the crawl
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL of the page that first referenced this item, `None` for the seed
    pub fn referrer(&self) -> Option<&Url> {
        self.referrer.as_ref()
    }

    /// Extracted HTML title, empty if none
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Outbound references in discovery order, duplicates included
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }
}
