//! RSS 2.0 (and the 0.91 / 0.92 documents that share its `<rss><channel>` shape).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extensions::{encoded_content, DublinCore, Syndication, TextInput};
use super::model::{DialectFeed, DialectItem, Feed, FeedItem};
use super::normalize::{Normalize, NormalizeItem};
use super::parser::FeedError;
use super::DialectKind;
use crate::util::{parse_date_time, parse_int};
use crate::xml::XmlElement;

/// A `<category>` with its optional taxonomy `domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rss20Category {
    pub domain: Option<String>,
    pub value: String,
}

impl Rss20Category {
    fn parse(element: &XmlElement) -> Self {
        Self {
            domain: element.attribute_value("domain"),
            value: element.text().to_string(),
        }
    }
}

/// `<cloud>` publish-subscribe endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cloud {
    pub domain: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub register_procedure: Option<String>,
    pub protocol: Option<String>,
}

/// Channel `<image>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rss20Image {
    pub title: Option<String>,
    pub url: Option<String>,
    pub link: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub description: Option<String>,
}

/// Item `<enclosure>` (podcast media and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enclosure {
    pub url: Option<String>,
    pub length: Option<u64>,
    pub media_type: Option<String>,
}

/// Item `<guid>`. `is_perma_link` is `None` when the attribute is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guid {
    pub value: String,
    pub is_perma_link: Option<bool>,
}

/// Item `<source>`: the channel the item was republished from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rss20Source {
    pub url: Option<String>,
    pub value: Option<String>,
}

/// An RSS 2.0 channel, field for field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rss20Feed {
    #[serde(skip)]
    pub original_document: Arc<str>,
    /// The root `version` attribute: `2.0`, `0.91`, `0.92`, ...
    pub version: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub managing_editor: Option<String>,
    pub web_master: Option<String>,
    pub docs: Option<String>,
    pub publishing_date_string: Option<String>,
    pub publishing_date: Option<DateTime<Utc>>,
    pub last_build_date_string: Option<String>,
    pub last_build_date: Option<DateTime<Utc>>,
    pub categories: Vec<Rss20Category>,
    pub generator: Option<String>,
    pub cloud: Option<Cloud>,
    pub ttl: Option<u32>,
    pub image: Option<Rss20Image>,
    pub text_input: Option<TextInput>,
    pub skip_hours: Vec<u8>,
    pub skip_days: Vec<String>,
    pub dublin_core: Option<DublinCore>,
    pub syndication: Option<Syndication>,
    pub items: Vec<Arc<Rss20Item>>,
}

/// An RSS 2.0 `<item>`, field for field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rss20Item {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<Rss20Category>,
    pub comments: Option<String>,
    pub enclosure: Option<Enclosure>,
    pub guid: Option<Guid>,
    pub publishing_date_string: Option<String>,
    pub publishing_date: Option<DateTime<Utc>>,
    pub source: Option<Rss20Source>,
    /// `content:encoded`
    pub content: Option<String>,
    pub dublin_core: Option<DublinCore>,
}

impl Rss20Feed {
    /// Builds the channel from an `<rss>` root.
    ///
    /// # Errors
    ///
    /// [`FeedError::MalformedMandatoryStructure`] when there is no `<channel>`.
    pub fn parse(original_document: Arc<str>, root: &XmlElement) -> Result<Self, FeedError> {
        let channel = root.child("channel").ok_or_else(|| {
            tracing::warn!("RSS document has no <channel>");
            FeedError::MalformedMandatoryStructure {
                dialect: DialectKind::Rss20,
                missing: "channel",
            }
        })?;

        // Some 0.9x-era producers put items next to the channel instead of inside it.
        let mut items: Vec<Arc<Rss20Item>> = channel
            .children("item")
            .map(|item| Arc::new(Rss20Item::parse(item)))
            .collect();
        if items.is_empty() {
            items = root
                .children("item")
                .map(|item| Arc::new(Rss20Item::parse(item)))
                .collect();
        }

        let publishing_date_string = channel.value("pubDate");
        let last_build_date_string = channel.value("lastBuildDate");

        Ok(Self {
            original_document,
            version: root.attribute_value("version"),
            title: channel.value("title"),
            link: channel.value("link"),
            description: channel.value("description"),
            language: channel.value("language"),
            copyright: channel.value("copyright"),
            managing_editor: channel.value("managingEditor"),
            web_master: channel.value("webMaster"),
            docs: channel.value("docs"),
            publishing_date: publishing_date_string.as_deref().and_then(parse_date_time),
            publishing_date_string,
            last_build_date: last_build_date_string.as_deref().and_then(parse_date_time),
            last_build_date_string,
            categories: channel.children("category").map(Rss20Category::parse).collect(),
            generator: channel.value("generator"),
            cloud: channel.child("cloud").map(parse_cloud),
            ttl: channel.value("ttl").as_deref().and_then(parse_int),
            image: channel.child("image").map(parse_image),
            text_input: channel.child("textInput").map(TextInput::parse),
            skip_hours: channel
                .child("skipHours")
                .map(|hours| {
                    hours
                        .children("hour")
                        .filter_map(|hour| parse_int(hour.text()))
                        .collect()
                })
                .unwrap_or_default(),
            skip_days: channel
                .child("skipDays")
                .map(|days| {
                    days.children("day")
                        .map(|day| day.text().to_string())
                        .filter(|day| !day.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            dublin_core: DublinCore::parse(channel),
            syndication: Syndication::parse(channel),
            items,
        })
    }
}

impl Rss20Item {
    pub fn parse(item: &XmlElement) -> Self {
        let publishing_date_string = item.value("pubDate");

        Self {
            title: item.value("title"),
            link: item.value("link"),
            description: item.value("description"),
            author: item.value("author"),
            categories: item.children("category").map(Rss20Category::parse).collect(),
            comments: item.value("comments"),
            enclosure: item.child("enclosure").map(|enclosure| Enclosure {
                url: enclosure.attribute_value("url"),
                length: enclosure.attribute("length").and_then(parse_int),
                media_type: enclosure.attribute_value("type"),
            }),
            guid: item.child("guid").map(|guid| Guid {
                value: guid.text().to_string(),
                is_perma_link: guid
                    .attribute("isPermaLink")
                    .and_then(|flag| match flag.trim().to_ascii_lowercase().as_str() {
                        "true" => Some(true),
                        "false" => Some(false),
                        _ => None,
                    }),
            }),
            publishing_date: publishing_date_string.as_deref().and_then(parse_date_time),
            publishing_date_string,
            source: item.child("source").map(|source| Rss20Source {
                url: source.attribute_value("url"),
                value: Some(source.text().to_string()).filter(|value| !value.is_empty()),
            }),
            content: encoded_content(item),
            dublin_core: DublinCore::parse(item),
        }
    }
}

fn parse_cloud(cloud: &XmlElement) -> Cloud {
    Cloud {
        domain: cloud.attribute_value("domain"),
        port: cloud.attribute("port").and_then(parse_int),
        path: cloud.attribute_value("path"),
        register_procedure: cloud.attribute_value("registerProcedure"),
        protocol: cloud.attribute_value("protocol"),
    }
}

fn parse_image(image: &XmlElement) -> Rss20Image {
    Rss20Image {
        title: image.value("title"),
        url: image.value("url"),
        link: image.value("link"),
        width: image.value("width").as_deref().and_then(parse_int),
        height: image.value("height").as_deref().and_then(parse_int),
        description: image.value("description"),
    }
}

impl Normalize for Rss20Feed {
    fn to_feed(self) -> Feed {
        let items = self
            .items
            .iter()
            .map(|item| Arc::clone(item).to_feed_item())
            .collect();

        // lastBuildDate is the channel's modification time; pubDate its publication time.
        let (last_updated_date_string, last_updated_date) = match &self.last_build_date_string {
            Some(_) => (self.last_build_date_string.clone(), self.last_build_date),
            None => (self.publishing_date_string.clone(), self.publishing_date),
        };

        Feed {
            kind: DialectKind::Rss20,
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            language: self.language.clone().or_else(|| {
                self.dublin_core
                    .as_ref()
                    .and_then(|dc| dc.language.clone())
            }),
            copyright: self.copyright.clone(),
            last_updated_date_string,
            last_updated_date,
            image_url: self.image.as_ref().and_then(|image| image.url.clone()),
            items,
            specific: DialectFeed::Rss20(self),
        }
    }
}

impl NormalizeItem for Rss20Item {
    fn to_feed_item(self: Arc<Self>) -> FeedItem {
        let dc = self.dublin_core.as_ref();

        FeedItem {
            id: self
                .guid
                .as_ref()
                .map(|guid| guid.value.clone())
                .filter(|id| !id.is_empty())
                .or_else(|| self.link.clone()),
            title: self.title.clone(),
            link: self.link.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            author: self
                .author
                .clone()
                .or_else(|| dc.and_then(|dc| dc.creator.clone())),
            categories: self
                .categories
                .iter()
                .map(|category| category.value.clone())
                .collect(),
            publishing_date_string: self.publishing_date_string.clone(),
            publishing_date: self.publishing_date,
            specific: DialectItem::Rss20(self),
        }
    }
}
