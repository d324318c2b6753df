use std::sync::Arc;

use super::model::{DialectFeed, DialectItem, Feed, FeedItem};

/// A dialect feed that can project itself onto the canonical [`Feed`].
///
/// The projection is pure. The dialect value is moved into
/// [`Feed::specific`] rather than copied.
pub trait Normalize {
    fn to_feed(self) -> Feed;
}

/// A dialect item that can project itself onto the canonical [`FeedItem`].
pub trait NormalizeItem {
    fn to_feed_item(self: Arc<Self>) -> FeedItem;
}

/// Converts any dialect tree into the canonical feed.
pub fn normalize(feed: DialectFeed) -> Feed {
    match feed {
        DialectFeed::Rss10(feed) => feed.to_feed(),
        DialectFeed::Rss20(feed) => feed.to_feed(),
        DialectFeed::Atom(feed) => feed.to_feed(),
    }
}

/// Converts a single dialect item into a canonical item.
pub fn normalize_item(item: DialectItem) -> FeedItem {
    match item {
        DialectItem::Rss10(item) => item.to_feed_item(),
        DialectItem::Rss20(item) => item.to_feed_item(),
        DialectItem::Atom(item) => item.to_feed_item(),
    }
}
