//! Meta and Open Graph directives

use ego_tree::{NodeId, Tree};
use html5ever::tendril::StrTendril;
use scraper::Node;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::document::{attribute_name, is_element, new_element};

/// Which attribute carries the directive's key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    /// `<meta name="...">`
    Name,
    /// `<meta property="...">`, used by Open Graph
    Property,
}

impl MetaKind {
    /// Attribute name for this kind
    pub fn attribute(&self) -> &'static str {
        match self {
            MetaKind::Name => "name",
            MetaKind::Property => "property",
        }
    }
}

/// A desired meta tag, identified by (kind, key)
///
/// In JSON a directive is written the way the tag is:
/// `{"name": "description", "content": "..."}` or
/// `{"property": "og:title", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDirective", into = "RawDirective")]
pub struct MetaDirective {
    pub kind: MetaKind,
    pub key: String,
    pub content: String,
}

impl MetaDirective {
    /// Directive keyed by the `name` attribute
    pub fn name(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: MetaKind::Name,
            key: key.into(),
            content: content.into(),
        }
    }

    /// Directive keyed by the `property` attribute
    pub fn property(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: MetaKind::Property,
            key: key.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    content: String,
}

impl TryFrom<RawDirective> for MetaDirective {
    type Error = String;

    fn try_from(raw: RawDirective) -> Result<Self, Self::Error> {
        match (raw.name, raw.property) {
            (Some(key), None) => Ok(MetaDirective::name(key, raw.content)),
            (None, Some(key)) => Ok(MetaDirective::property(key, raw.content)),
            (Some(_), Some(_)) => Err("meta directive has both name and property".to_string()),
            (None, None) => Err("meta directive needs a name or property".to_string()),
        }
    }
}

impl From<MetaDirective> for RawDirective {
    fn from(directive: MetaDirective) -> Self {
        let (name, property) = match directive.kind {
            MetaKind::Name => (Some(directive.key), None),
            MetaKind::Property => (None, Some(directive.key)),
        };
        RawDirective {
            name,
            property,
            content: directive.content,
        }
    }
}

/// Ensure the directive's tag exists exactly once in head with the desired content
///
/// Only the first matching tag is touched when the input already holds
/// duplicates.
pub(super) fn apply_directive(tree: &mut Tree<Node>, head: NodeId, directive: &MetaDirective) {
    let key_attr = directive.kind.attribute();

    let existing = tree.get(head).and_then(|head| {
        head.children()
            .find(|child| {
                is_element(child.value(), "meta")
                    && child
                        .value()
                        .as_element()
                        .and_then(|e| e.attr(key_attr))
                        == Some(directive.key.as_str())
            })
            .map(|child| child.id())
    });

    match existing {
        Some(id) => {
            trace!(key = %directive.key, "updating meta tag in place");
            if let Some(mut node) = tree.get_mut(id) {
                if let Node::Element(element) = node.value() {
                    element.attrs.insert(
                        attribute_name("content"),
                        StrTendril::from(directive.content.as_str()),
                    );
                }
            }
        }
        None => {
            trace!(key = %directive.key, "appending meta tag");
            if let Some(mut head) = tree.get_mut(head) {
                head.append(new_element(
                    "meta",
                    &[
                        (key_attr, directive.key.as_str()),
                        ("content", directive.content.as_str()),
                    ],
                ));
            }
        }
    }
}
