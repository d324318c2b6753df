//! Feed parsing for RSS 1.0, RSS 2.0 and Atom, plus HTML auto-discovery.
//!
//! # Architecture
//!
//! A document moves through four stages:
//!
//! - [`XmlElement::parse`](crate::xml::XmlElement::parse) builds a namespace-aware tree
//! - [`detect_dialect`] classifies the root element
//! - [`parse_dialect`] runs one dialect parser, producing a [`DialectFeed`]
//! - [`normalize`] projects the dialect tree onto the canonical [`Feed`]
//!
//! [`parse_feed`] chains all four. The dialect tree is never thrown away: it
//! travels inside [`Feed::specific`], and each [`FeedItem::specific`] shares
//! its dialect item with that tree.
//!
//! Separately, [`discover_feed_links`] finds `<link type="application/rss+xml">`
//! style advertisements in HTML and [`resolve_link`] makes them absolute.
//!
//! # Example
//!
//! ```
//! use feedkit::feed::{parse_feed, DialectKind};
//!
//! let feed = parse_feed(r#"<rss version="2.0"><channel>
//!     <title>Example</title>
//!     <item><title>Hello</title><guid>1</guid></item>
//! </channel></rss>"#)?;
//!
//! assert_eq!(feed.kind, DialectKind::Rss20);
//! assert_eq!(feed.title.as_deref(), Some("Example"));
//! assert_eq!(feed.items[0].id.as_deref(), Some("1"));
//! # Ok::<(), feedkit::feed::FeedError>(())
//! ```

pub mod atom;
mod detect;
mod discovery;
pub mod extensions;
mod model;
mod normalize;
mod parser;
pub mod rss10;
pub mod rss20;

pub use detect::{detect_dialect, DialectKind};
pub use discovery::{
    discover_feed_links, feed_links, resolve_link, resolve_link_with, DiscoveryError,
    HtmlFeedKind, HtmlFeedLink,
};
pub use model::{DialectFeed, DialectItem, Feed, FeedItem};
pub use normalize::{normalize, normalize_item, Normalize, NormalizeItem};
pub use parser::{parse_dialect, parse_feed, parse_feed_with, FeedError};
