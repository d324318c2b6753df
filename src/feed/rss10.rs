//! RSS 1.0 (RDF Site Summary).
//!
//! Unlike RSS 2.0, the `image`, `textinput` and `item` blocks are siblings of
//! `channel` under the `rdf:RDF` root, and every block carries an `rdf:about`
//! identity that is kept byte for byte.

use std::sync::Arc;

use serde::Serialize;

use super::extensions::{
    encoded_content, rdf_about, rdf_resource, DublinCore, Syndication, TextInput, RSS10_NS,
};
use super::model::{DialectFeed, DialectItem, Feed, FeedItem};
use super::normalize::{Normalize, NormalizeItem};
use super::parser::FeedError;
use super::DialectKind;
use crate::xml::XmlElement;

/// Top-level `<image>` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rss10Image {
    pub about: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rss10Feed {
    #[serde(skip)]
    pub original_document: Arc<str>,
    /// `rdf:about` of the channel.
    pub about: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// `rdf:resource` of the channel's `<image>` reference.
    pub image_resource: Option<String>,
    /// `rdf:resource` of the channel's `<textinput>` reference.
    pub text_input_resource: Option<String>,
    pub dublin_core: Option<DublinCore>,
    pub syndication: Option<Syndication>,
    pub image: Option<Rss10Image>,
    pub text_input: Option<TextInput>,
    pub items: Vec<Arc<Rss10Item>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rss10Item {
    pub about: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// `content:encoded`
    pub content: Option<String>,
    pub dublin_core: Option<DublinCore>,
}

impl Rss10Feed {
    /// Builds the feed from an `rdf:RDF` root.
    ///
    /// # Errors
    ///
    /// [`FeedError::MalformedMandatoryStructure`] when there is no `<channel>`.
    pub fn parse(original_document: Arc<str>, root: &XmlElement) -> Result<Self, FeedError> {
        let channel = child(root, "channel").ok_or_else(|| {
            tracing::warn!("RSS 1.0 document has no <channel>");
            FeedError::MalformedMandatoryStructure {
                dialect: DialectKind::Rss10,
                missing: "channel",
            }
        })?;

        // Items belong under the root; a few producers nest them in the channel.
        let mut items: Vec<Arc<Rss10Item>> = children(root, "item")
            .into_iter()
            .map(|item| Arc::new(Rss10Item::parse(item)))
            .collect();
        if items.is_empty() {
            items = children(channel, "item")
                .into_iter()
                .map(|item| Arc::new(Rss10Item::parse(item)))
                .collect();
        }

        Ok(Self {
            original_document,
            about: rdf_about(channel),
            title: value(channel, "title"),
            link: value(channel, "link"),
            description: value(channel, "description"),
            image_resource: child(channel, "image").and_then(rdf_resource),
            text_input_resource: child(channel, "textinput").and_then(rdf_resource),
            dublin_core: DublinCore::parse(channel),
            syndication: Syndication::parse(channel),
            image: child(root, "image").map(|image| Rss10Image {
                about: rdf_about(image),
                title: value(image, "title"),
                url: value(image, "url"),
                link: value(image, "link"),
            }),
            text_input: child(root, "textinput").map(|text_input| TextInput {
                about: rdf_about(text_input),
                title: value(text_input, "title"),
                description: value(text_input, "description"),
                name: value(text_input, "name"),
                link: value(text_input, "link"),
            }),
            items,
        })
    }
}

impl Rss10Item {
    pub fn parse(item: &XmlElement) -> Self {
        Self {
            about: rdf_about(item),
            title: value(item, "title"),
            link: value(item, "link"),
            description: value(item, "description"),
            content: encoded_content(item),
            dublin_core: DublinCore::parse(item),
        }
    }
}

// RSS 1.0 elements live in the RSS 1.0 namespace, either as the default
// namespace or bound to a prefix (`rss:channel`). Unqualified names are
// accepted when no namespaced match exists.

fn child<'a>(element: &'a XmlElement, name: &str) -> Option<&'a XmlElement> {
    element
        .child_ns(RSS10_NS, name)
        .or_else(|| element.child(name))
}

fn children<'a>(element: &'a XmlElement, name: &'a str) -> Vec<&'a XmlElement> {
    let bound: Vec<&XmlElement> = element.children_ns(RSS10_NS, name).collect();
    if bound.is_empty() {
        element.children(name).collect()
    } else {
        bound
    }
}

fn value(element: &XmlElement, name: &str) -> Option<String> {
    child(element, name).map(|found| found.text().to_string())
}

impl Normalize for Rss10Feed {
    fn to_feed(self) -> Feed {
        let items = self
            .items
            .iter()
            .map(|item| Arc::clone(item).to_feed_item())
            .collect();
        let dc = self.dublin_core.clone().unwrap_or_default();

        Feed {
            kind: DialectKind::Rss10,
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            language: dc.language.clone(),
            copyright: dc.rights.clone(),
            last_updated_date: dc.parsed_date(),
            last_updated_date_string: dc.date,
            image_url: self.image.as_ref().and_then(|image| image.url.clone()),
            items,
            specific: DialectFeed::Rss10(self),
        }
    }
}

impl NormalizeItem for Rss10Item {
    fn to_feed_item(self: Arc<Self>) -> FeedItem {
        let dc = self.dublin_core.clone().unwrap_or_default();

        FeedItem {
            id: self.about.clone().or_else(|| self.link.clone()),
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            author: dc.creator.clone(),
            categories: dc.subject.clone().into_iter().collect(),
            publishing_date: dc.parsed_date(),
            publishing_date_string: dc.date,
            specific: DialectItem::Rss10(self),
        }
    }
}
