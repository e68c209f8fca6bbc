//! Fixed body fragments (banners, comparison tables, inline styles)

use ego_tree::{NodeId, Tree};
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};

use super::document::{detach_all, graft_children, new_element};

/// A literal HTML fragment placed at the top of `<body>`
///
/// The fragment is wrapped in `<div id="{id}">`. A later run removes the
/// wrapper carrying the same id before inserting again, so fragments never
/// pile up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFragment {
    /// Element id of the wrapper
    pub id: String,

    /// Fragment markup
    pub html: String,
}

impl BodyFragment {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
        }
    }
}

/// Insert fragments before existing body content, keeping their listed order
pub(super) fn insert_fragments(tree: &mut Tree<Node>, body: NodeId, fragments: &[BodyFragment]) {
    if fragments.is_empty() {
        return;
    }

    let stale: Vec<NodeId> = match tree.get(body) {
        Some(body) => body
            .descendants()
            .filter(|node| {
                node.value()
                    .as_element()
                    .and_then(|e| e.id())
                    .is_some_and(|id| fragments.iter().any(|f| f.id == id))
            })
            .map(|node| node.id())
            .collect(),
        None => return,
    };
    detach_all(tree, stale);

    for fragment in fragments.iter().rev() {
        let parsed = Html::parse_fragment(&fragment.html);
        let wrapper = match tree.get_mut(body) {
            Some(mut body) => body
                .prepend(new_element("div", &[("id", fragment.id.as_str())]))
                .id(),
            None => return,
        };
        graft_children(tree, wrapper, *parsed.root_element());
    }
}
