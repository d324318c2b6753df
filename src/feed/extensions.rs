//! Namespaces and extension blocks shared by more than one dialect.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::util::{parse_date_time, parse_int};
use crate::xml::XmlElement;

pub const RSS10_NS: &str = "http://purl.org/rss/1.0/";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub const ATOM03_NS: &str = "http://purl.org/atom/ns#";
pub const DUBLIN_CORE_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const SYNDICATION_NS: &str = "http://purl.org/rss/1.0/modules/syndication/";
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// Reads an RDF resource identity (`rdf:about`) verbatim.
///
/// Resolved by namespace first so an unusual prefix still matches, then by the
/// conventional qualified name.
pub(crate) fn rdf_about(element: &XmlElement) -> Option<String> {
    element
        .attribute_ns(RDF_NS, "about")
        .or_else(|| element.attribute("rdf:about"))
        .map(str::to_string)
}

/// Reads an RDF resource reference (`rdf:resource`) verbatim.
pub(crate) fn rdf_resource(element: &XmlElement) -> Option<String> {
    element
        .attribute_ns(RDF_NS, "resource")
        .or_else(|| element.attribute("rdf:resource"))
        .map(str::to_string)
}

/// Dublin Core (`dc:`) metadata attached to a channel or item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DublinCore {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub contributor: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    pub identifier: Option<String>,
    pub source: Option<String>,
    pub language: Option<String>,
    pub relation: Option<String>,
    pub coverage: Option<String>,
    pub rights: Option<String>,
}

impl DublinCore {
    /// Collects the `dc:` children of `element`; `None` when there are none.
    pub(crate) fn parse(element: &XmlElement) -> Option<Self> {
        let dc = |name: &str| element.value_ns(DUBLIN_CORE_NS, name);
        let block = Self {
            title: dc("title"),
            creator: dc("creator"),
            subject: dc("subject"),
            description: dc("description"),
            publisher: dc("publisher"),
            contributor: dc("contributor"),
            date: dc("date"),
            kind: dc("type"),
            format: dc("format"),
            identifier: dc("identifier"),
            source: dc("source"),
            language: dc("language"),
            relation: dc("relation"),
            coverage: dc("coverage"),
            rights: dc("rights"),
        };
        (block != Self::default()).then_some(block)
    }

    /// `dc:date` converted to UTC, if present and parseable.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date_time)
    }
}

/// Syndication module (`sy:`) update schedule hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Syndication {
    /// `hourly`, `daily`, `weekly`, `monthly` or `yearly`.
    pub update_period: Option<String>,
    pub update_frequency: Option<u32>,
    pub update_base_string: Option<String>,
    pub update_base: Option<DateTime<Utc>>,
}

impl Syndication {
    pub(crate) fn parse(element: &XmlElement) -> Option<Self> {
        let update_base_string = element.value_ns(SYNDICATION_NS, "updateBase");
        let block = Self {
            update_period: element.value_ns(SYNDICATION_NS, "updatePeriod"),
            update_frequency: element
                .value_ns(SYNDICATION_NS, "updateFrequency")
                .as_deref()
                .and_then(parse_int),
            update_base: update_base_string.as_deref().and_then(parse_date_time),
            update_base_string,
        };
        (block != Self::default()).then_some(block)
    }
}

/// A text-input box advertised by an RSS channel (`textInput` / `textinput`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextInput {
    /// RDF identity, RSS 1.0 only.
    pub about: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
}

impl TextInput {
    pub(crate) fn parse(element: &XmlElement) -> Self {
        Self {
            about: rdf_about(element),
            title: element.value("title"),
            description: element.value("description"),
            name: element.value("name"),
            link: element.value("link"),
        }
    }
}

/// `content:encoded` of an item, if present.
pub(crate) fn encoded_content(element: &XmlElement) -> Option<String> {
    element.value_ns(CONTENT_NS, "encoded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;

    fn parse(text: &str) -> XmlElement {
        XmlElement::parse(text, &ParseConfig::default()).unwrap()
    }

    #[test]
    fn test_dublin_core_block() {
        let item = parse(
            r#"<item xmlns:dc="http://purl.org/dc/elements/1.1/">
                 <dc:creator>Jane Doe</dc:creator>
                 <dc:date>2024-03-01T12:00:00Z</dc:date>
                 <dc:type>Text</dc:type>
               </item>"#,
        );
        let dc = DublinCore::parse(&item).unwrap();
        assert_eq!(dc.creator.as_deref(), Some("Jane Doe"));
        assert_eq!(dc.kind.as_deref(), Some("Text"));
        assert_eq!(dc.title, None);
        assert_eq!(
            dc.parsed_date().map(|d| d.to_rfc3339()),
            Some("2024-03-01T12:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_dublin_core_absent() {
        let item = parse("<item><title>No DC</title></item>");
        assert_eq!(DublinCore::parse(&item), None);
    }

    #[test]
    fn test_syndication_block() {
        let channel = parse(
            r#"<channel xmlns:sy="http://purl.org/rss/1.0/modules/syndication/">
                 <sy:updatePeriod>hourly</sy:updatePeriod>
                 <sy:updateFrequency>2</sy:updateFrequency>
                 <sy:updateBase>2000-01-01T12:00+00:00</sy:updateBase>
               </channel>"#,
        );
        let sy = Syndication::parse(&channel).unwrap();
        assert_eq!(sy.update_period.as_deref(), Some("hourly"));
        assert_eq!(sy.update_frequency, Some(2));
        assert_eq!(
            sy.update_base_string.as_deref(),
            Some("2000-01-01T12:00+00:00")
        );
    }

    #[test]
    fn test_syndication_bad_frequency_is_absent() {
        let channel = parse(
            r#"<channel xmlns:sy="http://purl.org/rss/1.0/modules/syndication/">
                 <sy:updateFrequency>often</sy:updateFrequency>
               </channel>"#,
        );
        let sy = Syndication::parse(&channel).unwrap();
        assert_eq!(sy.update_frequency, None);
    }

    #[test]
    fn test_rdf_about_preserved_verbatim() {
        let element = parse(
            r#"<item xmlns:r="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                     r:about="http://example.com/a%20b?x=1"/>"#,
        );
        assert_eq!(
            rdf_about(&element).as_deref(),
            Some("http://example.com/a%20b?x=1")
        );
    }
}
