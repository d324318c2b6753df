use std::sync::Arc;

use thiserror::Error;

use super::atom::AtomFeed;
use super::model::{DialectFeed, Feed};
use super::normalize::normalize;
use super::rss10::Rss10Feed;
use super::rss20::Rss20Feed;
use super::{detect_dialect, DialectKind};
use crate::config::ParseConfig;
use crate::xml::{XmlElement, XmlError};

/// Document-level failures. Field-level problems (bad dates, missing optional
/// elements) never surface here; they become `None` in the parsed tree.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The text could not be turned into an XML tree.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The root element is not RSS 1.0, RSS 2.0 or Atom.
    #[error("unrecognized feed format: root element matches no known dialect")]
    UnrecognizedFormat,

    /// The dialect was recognized but its required container is missing.
    #[error("malformed {dialect} document: missing <{missing}>")]
    MalformedMandatoryStructure {
        dialect: DialectKind,
        missing: &'static str,
    },
}

/// Runs the parser for `kind` over an already-parsed root.
///
/// `raw` is the text `root` was parsed from; the returned tree keeps it.
/// Call [`detect_dialect`] first: parsers assume their own root shape.
///
/// # Errors
///
/// - [`FeedError::UnrecognizedFormat`] for [`DialectKind::Unknown`]
/// - [`FeedError::MalformedMandatoryStructure`] when an RSS `<channel>` is missing
pub fn parse_dialect(
    kind: DialectKind,
    raw: &str,
    root: &XmlElement,
) -> Result<DialectFeed, FeedError> {
    let original_document: Arc<str> = Arc::from(raw);

    match kind {
        DialectKind::Rss10 => Rss10Feed::parse(original_document, root).map(DialectFeed::Rss10),
        DialectKind::Rss20 => Rss20Feed::parse(original_document, root).map(DialectFeed::Rss20),
        DialectKind::Atom => Ok(DialectFeed::Atom(AtomFeed::parse(original_document, root))),
        DialectKind::Unknown => Err(FeedError::UnrecognizedFormat),
    }
}

/// Parses raw feed text into the canonical [`Feed`] using default limits.
///
/// # Errors
///
/// See [`parse_feed_with`].
pub fn parse_feed(raw: &str) -> Result<Feed, FeedError> {
    parse_feed_with(raw, &ParseConfig::default())
}

/// Parses raw feed text: XML tree, dialect detection, dialect parse, normalize.
///
/// # Errors
///
/// - [`FeedError::Xml`] when the text is not usable XML or breaks a limit
/// - [`FeedError::UnrecognizedFormat`] when the root matches no dialect
/// - [`FeedError::MalformedMandatoryStructure`] when the dialect's container is missing
///
/// No partial feed is ever returned alongside an error.
pub fn parse_feed_with(raw: &str, config: &ParseConfig) -> Result<Feed, FeedError> {
    let root = XmlElement::parse(raw, config)?;
    let kind = detect_dialect(&root);
    let specific = parse_dialect(kind, raw, &root)?;
    tracing::debug!(dialect = %kind, "Parsed feed document");
    Ok(normalize(specific))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_is_unrecognized() {
        let root = XmlElement::parse("<html/>", &ParseConfig::default()).unwrap();
        let result = parse_dialect(DialectKind::Unknown, "<html/>", &root);
        assert!(matches!(result, Err(FeedError::UnrecognizedFormat)));
    }

    #[test]
    fn test_parse_feed_unrecognized_root() {
        let result = parse_feed("<html><head><title>Page</title></head></html>");
        assert!(matches!(result, Err(FeedError::UnrecognizedFormat)));
    }

    #[test]
    fn test_parse_feed_invalid_xml() {
        let result = parse_feed("<not valid xml");
        assert!(matches!(result, Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_parse_feed_missing_channel() {
        let err = parse_feed(r#"<rss version="2.0"></rss>"#).unwrap_err();
        assert_eq!(err.to_string(), "malformed RSS 2.0 document: missing <channel>");
    }

    #[test]
    fn test_parse_feed_respects_limits() {
        let config = ParseConfig {
            max_depth: 2,
            ..ParseConfig::default()
        };
        let result = parse_feed_with(
            "<rss><channel><item><title>x</title></item></channel></rss>",
            &config,
        );
        assert!(matches!(result, Err(FeedError::Xml(XmlError::TooDeep(2)))));
    }

    #[test]
    fn test_parse_dialect_keeps_original_document() {
        let raw = r#"<rss version="2.0"><channel><title>T</title></channel></rss>"#;
        let root = XmlElement::parse(raw, &ParseConfig::default()).unwrap();
        let feed = parse_dialect(DialectKind::Rss20, raw, &root).unwrap();
        assert_eq!(feed.kind(), DialectKind::Rss20);
        assert_eq!(feed.original_document(), raw);
    }
}
