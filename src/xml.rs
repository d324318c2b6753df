//! Owned, namespace-aware XML element tree and the accessors dialect parsers use.
//!
//! The tree is built with `quick-xml`'s [`NsReader`], so every element and
//! attribute knows the namespace URI its prefix resolved to. Lookups never fail:
//! a missing child or attribute is `None`, because absence is the normal case
//! for optional feed fields.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

use crate::config::ParseConfig;
use crate::util::decode_html;

/// Errors produced while building the element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The text is not well-formed enough to build a tree from.
    #[error("XML parse error: {0}")]
    Malformed(String),

    /// SEC-003: Element nesting exceeds the configured limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    TooDeep(usize),

    /// The document is larger than the configured limit.
    #[error("XML document exceeds maximum size of {0} bytes")]
    TooLarge(usize),

    /// The text contains no element at all.
    #[error("XML document has no root element")]
    NoRoot,
}

/// A namespace binding declared on an element (`xmlns` or `xmlns:prefix`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    pub uri: String,
}

/// A single attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name as written, e.g. `rdf:about`.
    pub name: String,
    pub local_name: String,
    pub namespace: Option<String>,
    /// Unescaped value, preserved verbatim otherwise.
    pub value: String,
}

/// An element and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    local_name: String,
    prefix: Option<String>,
    namespace: Option<String>,
    namespaces: Vec<NamespaceDecl>,
    attributes: Vec<XmlAttribute>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parses `text` and returns its root element.
    ///
    /// # Security
    ///
    /// SEC-002: `quick-xml` (0.37) never parses `<!ENTITY>` declarations from a
    /// DOCTYPE. Besides the five XML builtins and character references, only the
    /// fixed HTML entity table (`&nbsp;`, `&eacute;`, ...) is resolved; any other
    /// entity reference is kept literally in the text.
    ///
    /// A leading UTF-8 byte-order mark is skipped, and elements still open at
    /// the end of input are closed.
    pub fn parse(text: &str, config: &ParseConfig) -> Result<Self, XmlError> {
        if text.len() > config.max_document_bytes {
            return Err(XmlError::TooLarge(config.max_document_bytes));
        }

        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = NsReader::from_str(text);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            let namespace = namespace_uri(&resolved);

            match event {
                Event::Start(start) => {
                    if stack.len() >= config.max_depth {
                        tracing::warn!(max_depth = config.max_depth, "XML nesting too deep");
                        return Err(XmlError::TooDeep(config.max_depth));
                    }
                    stack.push(open_element(&reader, &start, namespace));
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, &start, namespace);
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(content) => {
                    if let Some(current) = stack.last_mut() {
                        let decoded = match content.unescape() {
                            Ok(text) => text.into_owned(),
                            // HTML-only names such as `&nbsp;` fail the XML unescaper.
                            Err(_) => decode_html(&String::from_utf8_lossy(&content)),
                        };
                        current.text.push_str(&decoded);
                    }
                }
                Event::CData(content) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&content));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        // Unterminated documents are common enough in the wild; close what is open.
        if !stack.is_empty() {
            tracing::debug!(open = stack.len(), "Closing unterminated XML elements");
            while let Some(element) = stack.pop() {
                attach(&mut stack, &mut root, element);
            }
        }

        root.ok_or(XmlError::NoRoot)
    }

    /// Qualified name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Namespace URI the element's prefix (or the default namespace) resolved to.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Namespace bindings declared directly on this element.
    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// All child elements in document order.
    pub fn elements(&self) -> &[XmlElement] {
        &self.children
    }

    /// Direct text content, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Text of this element and all descendants, in document order.
    pub fn deep_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Whether this element declares a binding for `uri`.
    pub fn declares_namespace(&self, uri: &str) -> bool {
        self.namespaces.iter().any(|decl| decl.uri == uri)
    }

    /// First unprefixed child with the given local name (ASCII case-insensitive).
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| child.is_plain(local_name))
    }

    /// All unprefixed children with the given local name (ASCII case-insensitive).
    ///
    /// Prefixed children such as `dc:title` or `atom:link` never match, so an RSS
    /// `link` lookup is not confused by an embedded Atom link.
    pub fn children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.is_plain(local_name))
    }

    /// First child in namespace `ns` with the given local name.
    pub fn child_ns(&self, ns: &str, local_name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| child.is_in(ns, local_name))
    }

    /// All children in namespace `ns` with the given local name.
    pub fn children_ns<'a>(
        &'a self,
        ns: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.is_in(ns, local_name))
    }

    fn is_plain(&self, local_name: &str) -> bool {
        self.prefix.is_none() && self.local_name.eq_ignore_ascii_case(local_name)
    }

    fn is_in(&self, ns: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(ns) && self.local_name.eq_ignore_ascii_case(local_name)
    }

    /// Trimmed text of the first unprefixed child named `local_name`.
    ///
    /// A present-but-empty element yields `Some("")`; a missing one yields `None`.
    pub fn value(&self, local_name: &str) -> Option<String> {
        self.child(local_name).map(|child| child.text().to_string())
    }

    /// Trimmed text of the first child in namespace `ns` named `local_name`.
    pub fn value_ns(&self, ns: &str, local_name: &str) -> Option<String> {
        self.child_ns(ns, local_name)
            .map(|child| child.text().to_string())
    }

    /// Raw value of the attribute with the given qualified name, e.g. `rdf:about`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Raw value of the attribute in namespace `ns` with the given local name.
    pub fn attribute_ns(&self, ns: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.namespace.as_deref() == Some(ns) && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }

    /// Attribute value as an owned string, the shape dialect records store.
    pub fn attribute_value(&self, name: &str) -> Option<String> {
        self.attribute(name).map(str::to_string)
    }
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> XmlElement {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let prefix = start
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

    let mut namespaces = Vec::new();
    let mut attributes = Vec::new();

    for attr_result in start.attributes().with_checks(false) {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::debug!(element = %name, error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.decode_and_unescape_value(reader.decoder()) {
            Ok(value) => value.into_owned(),
            Err(_) => decode_html(&String::from_utf8_lossy(&attr.value)),
        };

        if key == "xmlns" {
            namespaces.push(NamespaceDecl { prefix: None, uri: value });
            continue;
        }
        if let Some(bound) = key.strip_prefix("xmlns:") {
            namespaces.push(NamespaceDecl {
                prefix: Some(bound.to_string()),
                uri: value,
            });
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        attributes.push(XmlAttribute {
            local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            namespace: namespace_uri(&resolved),
            name: key,
            value,
        });
    }

    XmlElement {
        name,
        local_name,
        prefix,
        namespace,
        namespaces,
        attributes,
        text: String::new(),
        children: Vec::new(),
    }
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> XmlElement {
        XmlElement::parse(text, &ParseConfig::default()).expect("test XML should parse")
    }

    #[test]
    fn test_namespaces_resolved() {
        let root = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns="http://purl.org/rss/1.0/">
                 <channel rdf:about="http://example.com/">
                   <title>Example</title>
                 </channel>
               </rdf:RDF>"#,
        );

        assert_eq!(root.name(), "rdf:RDF");
        assert_eq!(root.local_name(), "RDF");
        assert_eq!(root.prefix(), Some("rdf"));
        assert_eq!(
            root.namespace(),
            Some("http://www.w3.org/1999/02/22-rdf-syntax-ns#")
        );
        assert!(root.declares_namespace("http://purl.org/rss/1.0/"));

        let channel = root.child("channel").unwrap();
        assert_eq!(channel.namespace(), Some("http://purl.org/rss/1.0/"));
        assert_eq!(channel.attribute("rdf:about"), Some("http://example.com/"));
        assert_eq!(
            channel.attribute_ns("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "about"),
            Some("http://example.com/")
        );
        assert_eq!(channel.value("title").as_deref(), Some("Example"));
    }

    #[test]
    fn test_value_distinguishes_empty_from_missing() {
        let root = parse("<channel><title></title><link/></channel>");
        assert_eq!(root.value("title").as_deref(), Some(""));
        assert_eq!(root.value("link").as_deref(), Some(""));
        assert_eq!(root.value("description"), None);
    }

    #[test]
    fn test_child_lookup_is_case_insensitive() {
        let root = parse("<channel><textInput><name>q</name></textInput></channel>");
        assert!(root.child("textinput").is_some());
        assert!(root.child("TEXTINPUT").is_some());
    }

    #[test]
    fn test_prefixed_children_do_not_match_plain_lookup() {
        let root = parse(
            r#"<channel xmlns:atom="http://www.w3.org/2005/Atom">
                 <atom:link href="http://example.com/feed" rel="self"/>
                 <link>http://example.com/</link>
               </channel>"#,
        );
        assert_eq!(root.value("link").as_deref(), Some("http://example.com/"));
        let atom = root
            .child_ns("http://www.w3.org/2005/Atom", "link")
            .unwrap();
        assert_eq!(atom.attribute("href"), Some("http://example.com/feed"));
    }

    #[test]
    fn test_cdata_and_entities() {
        let root = parse(
            "<item><description><![CDATA[<p>Hello</p>]]></description><title>A &amp; B</title></item>",
        );
        assert_eq!(root.value("description").as_deref(), Some("<p>Hello</p>"));
        assert_eq!(root.value("title").as_deref(), Some("A & B"));
    }

    #[test]
    fn test_html_entities_decoded_alongside_builtins() {
        let root = parse(
            r#"<item><title>Tom &amp; Jerry&nbsp;x &#8217;s</title><link title="R&amp;D&eacute;"/></item>"#,
        );
        assert_eq!(
            root.value("title").as_deref(),
            Some("Tom & Jerry\u{a0}x \u{2019}s")
        );
        assert_eq!(root.child("link").unwrap().attribute("title"), Some("R&Dé"));
    }

    #[test]
    fn test_unknown_entity_kept_literally() {
        let root = parse("<title>a &bogus; &amp; b</title>");
        assert_eq!(root.text(), "a &bogus; & b");
    }

    #[test]
    fn test_unterminated_document_closed() {
        let root = parse("<rss><channel><title>T</title><item><title>I</title>");
        assert_eq!(root.name(), "rss");
        let channel = root.child("channel").unwrap();
        assert_eq!(channel.value("title").as_deref(), Some("T"));
        let items: Vec<_> = channel.children("item").collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value("title").as_deref(), Some("I"));
    }

    #[test]
    fn test_leading_bom_accepted() {
        let root = parse("\u{feff}<?xml version=\"1.0\"?><rss version=\"2.0\"><channel/></rss>");
        assert_eq!(root.name(), "rss");
        assert_eq!(root.attribute("version"), Some("2.0"));
        assert!(root.child("channel").is_some());
    }

    #[test]
    fn test_deep_text() {
        let root = parse("<content><div>Hello <b>world</b></div></content>");
        assert_eq!(root.text(), "");
        assert_eq!(root.deep_text(), "Hello world");
    }

    #[test]
    fn test_children_iterates_in_order() {
        let root = parse("<channel><item>1</item><other/><item>2</item></channel>");
        let texts: Vec<&str> = root.children("item").map(XmlElement::text).collect();
        assert_eq!(texts, vec!["1", "2"]);
        assert_eq!(root.elements().len(), 3);
    }

    #[test]
    fn test_attribute_entities_unescaped() {
        let root = parse(r#"<link href="http://x.com/?a=1&amp;b=2"/>"#);
        assert_eq!(root.attribute("href"), Some("http://x.com/?a=1&b=2"));
        assert_eq!(root.attribute_value("rel"), None);
    }

    #[test]
    fn test_malformed_xml_error() {
        let result = XmlElement::parse("<rss><channel></rss>", &ParseConfig::default());
        assert!(matches!(result, Err(XmlError::Malformed(_))));
    }

    #[test]
    fn test_no_root_error() {
        let result = XmlElement::parse("   ", &ParseConfig::default());
        assert!(matches!(result, Err(XmlError::NoRoot)));
    }

    #[test]
    fn test_too_large_rejected() {
        let config = ParseConfig {
            max_document_bytes: 16,
            ..ParseConfig::default()
        };
        let result = XmlElement::parse("<rss><channel></channel></rss>", &config);
        assert!(matches!(result, Err(XmlError::TooLarge(16))));
    }

    #[test]
    fn test_deeply_nested_rejected() {
        let config = ParseConfig {
            max_depth: 50,
            ..ParseConfig::default()
        };
        let mut xml = String::new();
        for _ in 0..100 {
            xml.push_str("<a>");
        }
        for _ in 0..100 {
            xml.push_str("</a>");
        }

        let result = XmlElement::parse(&xml, &config);
        let err = result.unwrap_err();
        assert!(matches!(err, XmlError::TooDeep(50)));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_nesting_at_depth_limit_allowed() {
        let config = ParseConfig {
            max_depth: 50,
            ..ParseConfig::default()
        };
        let mut xml = String::new();
        for _ in 0..50 {
            xml.push_str("<a>");
        }
        for _ in 0..50 {
            xml.push_str("</a>");
        }
        assert!(XmlElement::parse(&xml, &config).is_ok());
    }

    #[test]
    fn test_xxe_entity_not_expanded() {
        // SEC-002: The entity declaration must never be expanded into the text.
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE rss [<!ENTITY xxe SYSTEM "file:///etc/passwd"><!ENTITY internal "EXPANDED_VALUE">]>
<rss><channel><title>&xxe;</title><description>&internal;</description></channel></rss>"#;

        match XmlElement::parse(xml, &ParseConfig::default()) {
            Ok(root) => {
                let channel = root.child("channel").unwrap();
                let title = channel.value("title").unwrap_or_default();
                let description = channel.value("description").unwrap_or_default();
                assert!(!title.contains("root:"), "XXE expansion detected: {title}");
                assert!(
                    !description.contains("EXPANDED_VALUE"),
                    "Internal entity was expanded: {description}"
                );
            }
            Err(_) => {
                // Rejection is also acceptable behavior
            }
        }
    }
}
