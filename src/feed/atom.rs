//! Atom 1.0 (RFC 4287), with the Atom 0.3 element names accepted as fallbacks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extensions::ATOM_NS;
use super::model::{DialectFeed, DialectItem, Feed, FeedItem};
use super::normalize::{Normalize, NormalizeItem};
use super::DialectKind;
use crate::util::{parse_date_time, parse_int};
use crate::xml::XmlElement;

/// An Atom `<link>`. Feeds routinely carry several, told apart by `rel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomLink {
    pub href: Option<String>,
    pub rel: Option<String>,
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    pub length: Option<u64>,
}

impl AtomLink {
    fn parse(element: &XmlElement) -> Self {
        Self {
            href: element.attribute_value("href"),
            rel: element.attribute_value("rel"),
            media_type: element.attribute_value("type"),
            hreflang: element.attribute_value("hreflang"),
            title: element.attribute_value("title"),
            length: element.attribute("length").and_then(parse_int),
        }
    }

    /// A link without `rel` means `alternate` (RFC 4287 §4.2.7.2).
    pub fn is_alternate(&self) -> bool {
        match self.rel.as_deref() {
            None => true,
            Some(rel) => rel.trim().eq_ignore_ascii_case("alternate"),
        }
    }
}

/// Picks the link that points at the human-readable page.
///
/// Matched on `rel`, not position: the alternate link is preferred wherever it
/// sits, and only when there is none does the first link with an `href` win.
pub fn primary_link(links: &[AtomLink]) -> Option<&AtomLink> {
    links
        .iter()
        .find(|link| link.is_alternate() && link.href.is_some())
        .or_else(|| links.iter().find(|link| link.href.is_some()))
}

/// `<author>` / `<contributor>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomPerson {
    pub name: Option<String>,
    pub email: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomCategory {
    pub term: Option<String>,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomGenerator {
    pub value: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
}

/// `<content>`: inline text/html/xhtml, or out-of-line via `src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomContent {
    pub content_type: Option<String>,
    pub src: Option<String>,
    pub value: Option<String>,
}

/// The `<source>` feed an entry was copied from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomSource {
    pub id: Option<String>,
    pub title: Option<String>,
    pub updated_date_string: Option<String>,
    pub updated_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomFeed {
    #[serde(skip)]
    pub original_document: Arc<str>,
    /// The namespace the document was written in (Atom 1.0 or 0.3).
    pub namespace: String,
    pub id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// `xml:lang` of the root element.
    pub language: Option<String>,
    pub updated_date_string: Option<String>,
    pub updated_date: Option<DateTime<Utc>>,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
    pub generator: Option<AtomGenerator>,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub rights: Option<String>,
    pub entries: Vec<Arc<AtomEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<AtomContent>,
    pub published_date_string: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub updated_date_string: Option<String>,
    pub updated_date: Option<DateTime<Utc>>,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
    pub rights: Option<String>,
    pub source: Option<AtomSource>,
}

/// Element lookup bound to the namespace the document uses.
struct Atom<'a> {
    ns: &'a str,
}

impl Atom<'_> {
    fn value(&self, element: &XmlElement, name: &str) -> Option<String> {
        element.value_ns(self.ns, name)
    }

    /// First of several element names that is present (1.0 name first, then 0.3).
    fn value_any(&self, element: &XmlElement, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.value(element, name))
    }

    /// Text constructs may be `type="xhtml"` with markup children; keep their text.
    fn text_construct(&self, element: &XmlElement, names: &[&str]) -> Option<String> {
        names
            .iter()
            .find_map(|name| element.child_ns(self.ns, name))
            .map(construct_text)
    }

    fn links(&self, element: &XmlElement) -> Vec<AtomLink> {
        element
            .children_ns(self.ns, "link")
            .map(AtomLink::parse)
            .collect()
    }

    fn persons(&self, element: &XmlElement, name: &str) -> Vec<AtomPerson> {
        element
            .children_ns(self.ns, name)
            .map(|person| AtomPerson {
                name: self.value(person, "name"),
                email: self.value(person, "email"),
                uri: self.value_any(person, &["uri", "url"]),
            })
            .collect()
    }

    fn categories(&self, element: &XmlElement) -> Vec<AtomCategory> {
        element
            .children_ns(self.ns, "category")
            .map(|category| AtomCategory {
                term: category.attribute_value("term"),
                scheme: category.attribute_value("scheme"),
                label: category.attribute_value("label"),
            })
            .collect()
    }

    fn entry(&self, entry: &XmlElement) -> AtomEntry {
        let published_date_string = self.value_any(entry, &["published", "issued"]);
        let updated_date_string = self.value_any(entry, &["updated", "modified"]);

        AtomEntry {
            id: self.value(entry, "id"),
            title: self.text_construct(entry, &["title"]),
            summary: self.text_construct(entry, &["summary"]),
            content: entry.child_ns(self.ns, "content").map(|content| {
                let src = content.attribute_value("src");
                let value = construct_text(content);
                AtomContent {
                    content_type: content.attribute_value("type"),
                    // Out-of-line content is usually an empty element.
                    value: (!value.is_empty() || src.is_none()).then_some(value),
                    src,
                }
            }),
            published_date: published_date_string.as_deref().and_then(parse_date_time),
            published_date_string,
            updated_date: updated_date_string.as_deref().and_then(parse_date_time),
            updated_date_string,
            links: self.links(entry),
            authors: self.persons(entry, "author"),
            contributors: self.persons(entry, "contributor"),
            categories: self.categories(entry),
            rights: self.text_construct(entry, &["rights", "copyright"]),
            source: entry.child_ns(self.ns, "source").map(|source| {
                let updated_date_string = self.value(source, "updated");
                AtomSource {
                    id: self.value(source, "id"),
                    title: self.text_construct(source, &["title"]),
                    updated_date: updated_date_string.as_deref().and_then(parse_date_time),
                    updated_date_string,
                }
            }),
        }
    }
}

/// Plain text of a text construct; `xhtml` constructs contribute their markup's text.
fn construct_text(element: &XmlElement) -> String {
    if element.elements().is_empty() {
        element.text().to_string()
    } else {
        element.deep_text()
    }
}

impl AtomFeed {
    /// Builds the feed from a `<feed>` root. The root is the container, so once
    /// detection has accepted it there is nothing mandatory left to miss.
    pub fn parse(original_document: Arc<str>, root: &XmlElement) -> Self {
        let namespace = root.namespace().unwrap_or(ATOM_NS).to_string();
        let atom = Atom { ns: &namespace };
        let updated_date_string = atom.value_any(root, &["updated", "modified"]);

        Self {
            original_document,
            namespace: namespace.clone(),
            id: atom.value(root, "id"),
            title: atom.text_construct(root, &["title"]),
            subtitle: atom.text_construct(root, &["subtitle", "tagline"]),
            language: root.attribute_value("xml:lang"),
            updated_date: updated_date_string.as_deref().and_then(parse_date_time),
            updated_date_string,
            links: atom.links(root),
            authors: atom.persons(root, "author"),
            contributors: atom.persons(root, "contributor"),
            categories: atom.categories(root),
            generator: root.child_ns(atom.ns, "generator").map(|generator| AtomGenerator {
                value: Some(generator.text().to_string()).filter(|value| !value.is_empty()),
                uri: generator
                    .attribute_value("uri")
                    .or_else(|| generator.attribute_value("url")),
                version: generator.attribute_value("version"),
            }),
            icon: atom.value(root, "icon"),
            logo: atom.value(root, "logo"),
            rights: atom.text_construct(root, &["rights", "copyright"]),
            entries: root
                .children_ns(atom.ns, "entry")
                .map(|entry| Arc::new(atom.entry(entry)))
                .collect(),
        }
    }
}

impl Normalize for AtomFeed {
    fn to_feed(self) -> Feed {
        let items = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry).to_feed_item())
            .collect();

        Feed {
            kind: DialectKind::Atom,
            title: self.title.clone(),
            link: primary_link(&self.links).and_then(|link| link.href.clone()),
            description: self.subtitle.clone(),
            language: self.language.clone(),
            copyright: self.rights.clone(),
            last_updated_date_string: self.updated_date_string.clone(),
            last_updated_date: self.updated_date,
            image_url: self.logo.clone().or_else(|| self.icon.clone()),
            items,
            specific: DialectFeed::Atom(self),
        }
    }
}

impl NormalizeItem for AtomEntry {
    fn to_feed_item(self: Arc<Self>) -> FeedItem {
        let content = self
            .content
            .as_ref()
            .and_then(|content| content.value.clone());
        let (publishing_date_string, publishing_date) = match &self.published_date_string {
            Some(_) => (self.published_date_string.clone(), self.published_date),
            None => (self.updated_date_string.clone(), self.updated_date),
        };

        FeedItem {
            id: self.id.clone(),
            title: self.title.clone(),
            link: primary_link(&self.links).and_then(|link| link.href.clone()),
            description: self.summary.clone().or_else(|| content.clone()),
            content,
            author: self.authors.iter().find_map(|author| author.name.clone()),
            categories: self
                .categories
                .iter()
                .filter_map(|category| category.term.clone().or_else(|| category.label.clone()))
                .collect(),
            publishing_date_string,
            publishing_date,
            specific: DialectItem::Atom(self),
        }
    }
}
