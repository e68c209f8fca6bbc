//! JSON-LD structured data blocks

use ego_tree::{NodeId, Tree};
use scraper::Node;
use serde_json::Value;
use tracing::debug;

use super::document::{detach_all, is_element, new_element, new_text, text_content};

const LD_JSON: &str = "application/ld+json";

/// Identity of a structured-data block: `@type` plus `name`, or `sku` when unnamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIdentity {
    pub block_type: String,
    pub key: String,
}

impl BlockIdentity {
    /// Derive the identity of a JSON value, if it has one
    pub fn of(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let block_type = scalar(object.get("@type")?)?;
        let key = object
            .get("name")
            .and_then(scalar)
            .or_else(|| object.get("sku").and_then(scalar))?;
        Some(Self { block_type, key })
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_ld_json_script(node: &Node) -> bool {
    is_element(node, "script")
        && node
            .as_element()
            .and_then(|e| e.attr("type"))
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(LD_JSON))
}

/// Serialize a block for embedding inside `<script>`
///
/// `</` is escaped so block text can never close the script element early.
fn script_body(block: &Value) -> String {
    block.to_string().replace("</", "<\\/")
}

/// Remove blocks sharing an identity with `blocks`, then append `blocks` to head
///
/// A block without an identity only replaces an identical block. Scripts
/// whose text is not valid JSON are left alone.
pub(super) fn replace_blocks(tree: &mut Tree<Node>, head: NodeId, blocks: &[Value]) {
    if blocks.is_empty() {
        return;
    }

    let wanted: Vec<BlockIdentity> = blocks.iter().filter_map(BlockIdentity::of).collect();

    let stale: Vec<NodeId> = match tree.get(head) {
        Some(head) => head
            .children()
            .filter(|child| is_ld_json_script(child.value()))
            .filter(|child| {
                let text = text_content(*child);
                match serde_json::from_str::<Value>(&text) {
                    Ok(existing) => match BlockIdentity::of(&existing) {
                        Some(id) => wanted.contains(&id),
                        None => blocks.contains(&existing),
                    },
                    Err(e) => {
                        debug!("Skipping unparseable JSON-LD block: {}", e);
                        false
                    }
                }
            })
            .map(|child| child.id())
            .collect(),
        None => return,
    };

    debug!("Replacing {} existing JSON-LD blocks", stale.len());
    detach_all(tree, stale);

    for block in blocks {
        let Some(mut head) = tree.get_mut(head) else {
            return;
        };
        let mut script = head.append(new_element("script", &[("type", LD_JSON)]));
        script.append(new_text(&script_body(block)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_prefers_name() {
        let id = BlockIdentity::of(&json!({"@type": "Product", "name": "Foo", "sku": "F-1"}))
            .unwrap();
        assert_eq!(id.block_type, "Product");
        assert_eq!(id.key, "Foo");
    }

    #[test]
    fn test_identity_falls_back_to_sku() {
        let id = BlockIdentity::of(&json!({"@type": "Product", "sku": 42})).unwrap();
        assert_eq!(id.key, "42");
    }

    #[test]
    fn test_identity_requires_type_and_key() {
        assert!(BlockIdentity::of(&json!({"name": "Foo"})).is_none());
        assert!(BlockIdentity::of(&json!({"@type": "Organization"})).is_none());
        assert!(BlockIdentity::of(&json!(["@type", "Product"])).is_none());
    }

    #[test]
    fn test_anonymous_block_replaces_identical_copy() {
        let block = json!({"@context": "https://schema.org", "@type": "WebSite"});
        let html = format!(
            r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#,
            block
        );
        let mut document = scraper::Html::parse_document(&html);
        let (head, _) = crate::merge::document::ensure_head_and_body(&mut document).unwrap();

        replace_blocks(&mut document.tree, head, &[block]);

        assert_eq!(document.html().matches("application/ld+json").count(), 1);
    }

    #[test]
    fn test_script_body_escapes_closing_tags() {
        let body = script_body(&json!({"description": "a</script>b"}));
        assert!(!body.contains("</script>"));
        let back: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(back["description"], "a</script>b");
    }
}
