use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::atom::{AtomEntry, AtomFeed};
use super::rss10::{Rss10Feed, Rss10Item};
use super::rss20::{Rss20Feed, Rss20Item};
use super::DialectKind;

// ============================================================================
// Dialect-specific trees
// ============================================================================

/// A document parsed by exactly one dialect parser.
///
/// Adding a dialect means adding a variant here and in [`DialectItem`]; every
/// `match` over them is exhaustive, so the compiler points at each place that
/// needs the new case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dialect", content = "feed")]
pub enum DialectFeed {
    Rss10(Rss10Feed),
    Rss20(Rss20Feed),
    Atom(AtomFeed),
}

impl DialectFeed {
    pub fn kind(&self) -> DialectKind {
        match self {
            Self::Rss10(_) => DialectKind::Rss10,
            Self::Rss20(_) => DialectKind::Rss20,
            Self::Atom(_) => DialectKind::Atom,
        }
    }

    /// The raw text this tree was parsed from.
    pub fn original_document(&self) -> &str {
        match self {
            Self::Rss10(feed) => &feed.original_document,
            Self::Rss20(feed) => &feed.original_document,
            Self::Atom(feed) => &feed.original_document,
        }
    }
}

/// Shared handle to the dialect item a [`FeedItem`] was derived from.
///
/// The same `Arc` lives in the dialect feed's item list, so nothing is copied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dialect", content = "item")]
pub enum DialectItem {
    Rss10(Arc<Rss10Item>),
    Rss20(Arc<Rss20Item>),
    Atom(Arc<AtomEntry>),
}

impl DialectItem {
    pub fn kind(&self) -> DialectKind {
        match self {
            Self::Rss10(_) => DialectKind::Rss10,
            Self::Rss20(_) => DialectKind::Rss20,
            Self::Atom(_) => DialectKind::Atom,
        }
    }
}

// ============================================================================
// Canonical model
// ============================================================================

/// The normalized feed, the same shape whichever dialect produced it.
///
/// Fields with no counterpart in the source document are `None`. Anything the
/// canonical shape has no room for is still reachable through [`Feed::specific`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub kind: DialectKind,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub last_updated_date_string: Option<String>,
    pub last_updated_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub items: Vec<FeedItem>,
    /// The dialect tree this feed was normalized from, owned.
    pub specific: DialectFeed,
}

impl Feed {
    /// The raw text the feed was parsed from.
    pub fn original_document(&self) -> &str {
        self.specific.original_document()
    }
}

/// A normalized feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    /// Atom `id`; RSS `guid` or `rdf:about`, else the item link.
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    /// The date text exactly as it appeared.
    pub publishing_date_string: Option<String>,
    /// `publishing_date_string` in UTC; `None` when absent or unparseable.
    pub publishing_date: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub specific: DialectItem,
}
