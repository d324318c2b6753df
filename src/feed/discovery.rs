use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::ParseConfig;
use crate::util::decode_html;

/// Every `<link>` that declares a type; the RSS/Atom filter runs per element so
/// the match is case-insensitive.
static TYPED_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[type]").expect("Failed to parse link selector - this is a bug")
});

/// Which kind of feed an auto-discovery link advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HtmlFeedKind {
    Rss,
    Atom,
}

impl HtmlFeedKind {
    /// Classifies a `type` attribute: `application/rss*` or `application/atom*`.
    fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.contains("application/rss") {
            Some(Self::Rss)
        } else if mime.contains("application/atom") {
            Some(Self::Atom)
        } else {
            None
        }
    }
}

/// A feed advertised by an HTML page via `<link type="application/rss+xml" ...>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlFeedLink {
    /// Entity-decoded `title` attribute, if the page gave one.
    pub title: Option<String>,
    /// Entity-decoded `href`, exactly as found (possibly relative).
    pub url: String,
    pub kind: HtmlFeedKind,
}

/// Errors that can occur while making a discovered link absolute.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Neither the link nor the link joined to the page forms an absolute URL.
    #[error("cannot build an absolute feed URL from page {page_url:?} and link {link_url:?}")]
    UnresolvableUrl { page_url: String, link_url: String },
}

/// Yields the feed auto-discovery links of an already-parsed page, lazily and in
/// document order.
pub fn feed_links(document: &Html) -> impl Iterator<Item = HtmlFeedLink> + '_ {
    document.select(&TYPED_LINK_SELECTOR).filter_map(to_feed_link)
}

/// Scans HTML text for feed auto-discovery links.
///
/// The markup is parsed permissively (unclosed and stray tags are tolerated).
/// Every `<link>` whose `type` contains `application/rss` or `application/atom`
/// is reported, whatever its `rel`. Links without an `href` are skipped.
///
/// The returned iterator is single-pass; scan the text again to start over.
///
/// # Examples
///
/// ```
/// use feedkit::feed::{discover_feed_links, HtmlFeedKind};
///
/// let html = r#"<head><link rel="alternate" type="application/atom+xml" href="/atom.xml"></head>"#;
/// let links: Vec<_> = discover_feed_links(html).collect();
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].url, "/atom.xml");
/// assert_eq!(links[0].kind, HtmlFeedKind::Atom);
/// ```
pub fn discover_feed_links(html: &str) -> impl Iterator<Item = HtmlFeedLink> {
    // The returned iterator cannot borrow the page it would own.
    let document = Html::parse_document(html);
    let links: Vec<HtmlFeedLink> = feed_links(&document).collect();
    tracing::debug!(count = links.len(), "Discovered feed links in HTML");
    links.into_iter()
}

/// Builds a link from a typed `<link>` element.
///
/// `scraper` has already decoded one level of entities in attribute values;
/// `title` and `href` are decoded once more, so double-escaped markup such as
/// `R&amp;amp;D` also comes out as `R&D`. A title that literally means
/// `R&amp;D` is therefore reported as `R&D`.
fn to_feed_link(element: ElementRef<'_>) -> Option<HtmlFeedLink> {
    let attrs = element.value();
    let kind = HtmlFeedKind::from_mime(attrs.attr("type")?)?;

    let Some(href) = attrs.attr("href") else {
        tracing::debug!(kind = ?kind, "Skipping feed link without href");
        return None;
    };

    Some(HtmlFeedLink {
        title: attrs.attr("title").map(decode_html),
        url: decode_html(href),
        kind,
    })
}

/// Makes a discovered link absolute relative to the page it was found on.
///
/// # Errors
///
/// See [`resolve_link_with`].
pub fn resolve_link(page_url: &str, link: &HtmlFeedLink) -> Result<HtmlFeedLink, DiscoveryError> {
    resolve_link_with(page_url, link, &ParseConfig::default())
}

/// Makes a discovered link absolute relative to the page it was found on.
///
/// 1. Links already starting with `http://` or `https://` (any case) are
///    returned unchanged.
/// 2. Protocol-relative links (`//host/path`) get
///    [`ParseConfig::protocol_relative_scheme`] prepended.
/// 3. Other links that parse as absolute URLs with an authority are returned
///    in parsed form.
/// 4. Everything else is appended to the page's origin with exactly one `/`
///    between them. A page URL without a scheme is taken as `http://`.
///
/// # Errors
///
/// Returns [`DiscoveryError::UnresolvableUrl`], naming both URLs, when step 4
/// still does not produce a valid absolute URL.
///
/// # Examples
///
/// ```
/// use feedkit::feed::{resolve_link, HtmlFeedKind, HtmlFeedLink};
///
/// let link = HtmlFeedLink { title: None, url: "/feed.xml".into(), kind: HtmlFeedKind::Rss };
/// let resolved = resolve_link("codehollow.com", &link).unwrap();
/// assert_eq!(resolved.url, "http://codehollow.com/feed.xml");
/// ```
pub fn resolve_link_with(
    page_url: &str,
    link: &HtmlFeedLink,
    config: &ParseConfig,
) -> Result<HtmlFeedLink, DiscoveryError> {
    let href = decode_html(link.url.trim());
    let lower = href.to_ascii_lowercase();

    // Already absolute
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(link.clone());
    }

    // Protocol-relative
    if href.starts_with("//") {
        return Ok(HtmlFeedLink {
            url: format!("{}:{}", config.protocol_relative_scheme, href),
            ..link.clone()
        });
    }

    // Absolute in some other scheme (`feed://`, `ftp://`, ...)
    if let Ok(absolute) = Url::parse(&href) {
        if absolute.has_host() {
            return Ok(HtmlFeedLink {
                url: absolute.to_string(),
                ..link.clone()
            });
        }
    }

    // Relative: join to the page's origin
    let unresolvable = || DiscoveryError::UnresolvableUrl {
        page_url: page_url.to_string(),
        link_url: link.url.clone(),
    };
    let page = absolute_page_url(page_url).ok_or_else(unresolvable)?;
    let origin = page.origin();
    if !origin.is_tuple() {
        return Err(unresolvable());
    }

    let joined = format!(
        "{}/{}",
        origin.ascii_serialization(),
        href.trim_start_matches('/')
    );
    let resolved = Url::parse(&joined).map_err(|_| unresolvable())?;

    Ok(HtmlFeedLink {
        url: resolved.to_string(),
        ..link.clone()
    })
}

/// Parses the page URL, assuming `http://` when it carries no scheme.
fn absolute_page_url(page_url: &str) -> Option<Url> {
    let page_url = page_url.trim();
    if page_url.is_empty() {
        return None;
    }
    let with_scheme = if page_url.contains("://") {
        page_url.to_string()
    } else {
        format!("http://{}", page_url.trim_start_matches('/'))
    };
    Url::parse(&with_scheme).ok().filter(Url::has_host)
}
