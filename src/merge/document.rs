//! Tree helpers shared by the merge passes

use ego_tree::{NodeId, NodeRef, Tree};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{Html, Node};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Qualified name for an HTML element
fn element_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

/// Qualified name for an attribute in the null namespace
pub(super) fn attribute_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

/// Build an element node with the given attributes, in order
pub(super) fn new_element(local: &str, attributes: &[(&str, &str)]) -> Node {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: attribute_name(name),
            value: StrTendril::from(*value),
        })
        .collect();
    Node::Element(Element::new(element_name(local), attrs))
}

/// Build a text node
pub(super) fn new_text(text: &str) -> Node {
    Node::Text(Text {
        text: StrTendril::from(text),
    })
}

/// True when the node is an element with the given local name
pub(super) fn is_element(node: &Node, local: &str) -> bool {
    node.as_element().is_some_and(|e| e.name() == local)
}

/// Concatenated text of all descendants
pub(super) fn text_content(node: NodeRef<'_, Node>) -> String {
    node.descendants()
        .filter_map(|n| n.value().as_text().map(|t| t.text.to_string()))
        .collect()
}

/// Find a direct child element of `parent` by name, or create one
///
/// New `head` elements go first under the root, anything else is appended.
fn ensure_child(tree: &mut Tree<Node>, parent: NodeId, local: &str) -> Option<NodeId> {
    let existing = tree
        .get(parent)?
        .children()
        .find(|child| is_element(child.value(), local))
        .map(|child| child.id());
    if existing.is_some() {
        return existing;
    }

    let mut parent = tree.get_mut(parent)?;
    let created = if local == "head" {
        parent.prepend(new_element(local, &[]))
    } else {
        parent.append(new_element(local, &[]))
    };
    Some(created.id())
}

/// Locate `<head>` and `<body>`, attaching either when missing
pub(super) fn ensure_head_and_body(document: &mut Html) -> Option<(NodeId, NodeId)> {
    let root = document
        .tree
        .root()
        .children()
        .find(|child| is_element(child.value(), "html"))
        .map(|child| child.id())?;

    let head = ensure_child(&mut document.tree, root, "head")?;
    let body = ensure_child(&mut document.tree, root, "body")?;
    Some((head, body))
}

/// Detach every node in `ids` from the tree
pub(super) fn detach_all(tree: &mut Tree<Node>, ids: impl IntoIterator<Item = NodeId>) {
    for id in ids {
        if let Some(mut node) = tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Deep-copy the children of `source` (from another tree) under `parent`
pub(super) fn graft_children(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let Some(mut target) = tree.get_mut(parent) else {
            return;
        };
        let copied = target.append(child.value().clone()).id();
        graft_children(tree, copied, child);
    }
}
