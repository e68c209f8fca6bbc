//! # Metadata Merge Module
//!
//! This module rewrites the `<head>` of an HTML document so that a desired set
//! of meta tags and JSON-LD blocks is present exactly once, and optionally
//! places fixed fragments at the top of `<body>`.
//!
//! ## Key Components
//!
//! - `MetaDirective`: A desired `<meta name|property content>` tag
//! - `BlockIdentity`: The (`@type`, `name`) key used to replace JSON-LD blocks
//! - `BodyFragment`: Literal markup wrapped in an element with a fixed id
//! - `PageEdits`: Everything one run wants to change on a page
//! - `merge` / `merge_page`: The pure text transforms
//!
//! ## Behavior
//!
//! - Meta tags are updated in place when present, appended to head otherwise
//! - JSON-LD blocks are deleted by identity and re-appended
//! - Scripts holding invalid JSON are never touched
//! - Merging is idempotent and never fails; input the parser cannot make sense
//!   of is carried through as the parser recovered it

mod document;
mod fragment;
mod meta;
mod structured_data;

pub use fragment::BodyFragment;
pub use meta::{MetaDirective, MetaKind};
pub use structured_data::BlockIdentity;

use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// The set of edits applied to one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageEdits {
    /// Meta and Open Graph tags
    #[serde(default)]
    pub meta: Vec<MetaDirective>,

    /// JSON-LD objects
    #[serde(default)]
    pub structured_data: Vec<Value>,

    /// Fragments placed at the top of body
    #[serde(default)]
    pub fragments: Vec<BodyFragment>,
}

impl PageEdits {
    /// True when applying these edits would leave a page unchanged
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.structured_data.is_empty() && self.fragments.is_empty()
    }
}

/// Merge meta directives and structured-data blocks into `html`
pub fn merge(html: &str, directives: &[MetaDirective], blocks: &[Value]) -> String {
    merge_page(
        html,
        &PageEdits {
            meta: directives.to_vec(),
            structured_data: blocks.to_vec(),
            fragments: Vec::new(),
        },
    )
}

/// Apply a full set of page edits to `html`
///
/// # Arguments
///
/// * `html` - The page markup
/// * `edits` - Meta directives, JSON-LD blocks and body fragments
///
/// # Returns
///
/// The serialized document
pub fn merge_page(html: &str, edits: &PageEdits) -> String {
    let mut document = Html::parse_document(html);

    let Some((head, body)) = document::ensure_head_and_body(&mut document) else {
        warn!("Document has no root element, leaving it unchanged");
        return html.to_string();
    };

    for directive in &edits.meta {
        meta::apply_directive(&mut document.tree, head, directive);
    }
    structured_data::replace_blocks(&mut document.tree, head, &edits.structured_data);
    fragment::insert_fragments(&mut document.tree, body, &edits.fragments);

    debug!(
        "Merged {} meta directives, {} JSON-LD blocks, {} fragments",
        edits.meta.len(),
        edits.structured_data.len(),
        edits.fragments.len()
    );

    document.html()
}
