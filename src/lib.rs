//! Lenient syndication feed parsing.
//!
//! `feedkit` reads RSS 1.0 (RDF), RSS 2.0 (and the 0.9x family) and Atom
//! (1.0 and 0.3) into one normalized [`Feed`] while keeping the full
//! dialect-specific tree, and finds feeds advertised by HTML pages.
//!
//! Real-world feeds are messy, so parsing is forgiving at the field level:
//! a bad date or a missing optional element becomes `None` and the rest of
//! the document still parses. Only document-level problems are errors.
//!
//! - [`feed`] - dialect detection, parsers, canonical model, discovery
//! - [`xml`] - the namespace-aware element tree parsers read from
//! - [`util`] - lenient date, number and entity conversions
//! - [`config`] - parse limits, loadable from TOML
//!
//! Fetching documents over the network is left to the caller.

pub mod config;
pub mod feed;
pub mod util;
pub mod xml;

pub use config::ParseConfig;
pub use feed::{
    discover_feed_links, parse_feed, parse_feed_with, resolve_link, DialectFeed, DialectKind,
    Feed, FeedError, FeedItem, HtmlFeedKind, HtmlFeedLink,
};
