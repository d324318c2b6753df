use std::fmt;

use serde::Serialize;

use super::extensions::{ATOM03_NS, ATOM_NS, RSS10_NS};
use crate::xml::XmlElement;

/// The syndication grammar a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DialectKind {
    Rss10,
    Rss20,
    Atom,
    /// The root matched none of the above; parsing it is an error.
    Unknown,
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rss10 => "RSS 1.0",
            Self::Rss20 => "RSS 2.0",
            Self::Atom => "Atom",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies a document by its root element.
///
/// - `rdf:RDF` that declares the RSS 1.0 namespace ⇒ [`DialectKind::Rss10`]
/// - `rss`, in any case ⇒ [`DialectKind::Rss20`]; the `version` attribute is left
///   to the parser. No namespace is required, so any XML whose root happens to
///   be `<rss>` is accepted as RSS.
/// - `feed` in the Atom 1.0 or 0.3 namespace ⇒ [`DialectKind::Atom`]
/// - anything else ⇒ [`DialectKind::Unknown`]
pub fn detect_dialect(root: &XmlElement) -> DialectKind {
    let local_name = root.local_name();

    let kind = if local_name == "RDF" && declares_rss10(root) {
        DialectKind::Rss10
    } else if local_name.eq_ignore_ascii_case("rss") {
        DialectKind::Rss20
    } else if local_name == "feed" && matches!(root.namespace(), Some(ATOM_NS | ATOM03_NS)) {
        DialectKind::Atom
    } else {
        DialectKind::Unknown
    };

    if kind == DialectKind::Unknown {
        tracing::debug!(
            root = %root.name(),
            namespace = ?root.namespace(),
            "Root element matches no known dialect"
        );
    }
    kind
}

/// The RSS 1.0 namespace is normally declared on the root; some producers only
/// declare it on the `channel` element.
fn declares_rss10(root: &XmlElement) -> bool {
    root.declares_namespace(RSS10_NS)
        || root
            .elements()
            .iter()
            .any(|child| child.namespace() == Some(RSS10_NS))
}
