//! Edit plan: what one run writes
//!
//! The plan is a JSON document kept next to the site (or anywhere the
//! scheduler can read it). Page edits sit at the top level:
//!
//! ```json
//! {
//!   "meta": [{"name": "description", "content": "Standing desks, reviewed"}],
//!   "structured_data": [{"@context": "https://schema.org", "@type": "Organization", "name": "Acme"}],
//!   "fragments": [{"id": "sale-banner", "html": "<p>Spring sale</p>"}],
//!   "sitemap_paths": ["/about.html"],
//!   "listing": {"title": "Compare desks", "entries": [{"name": "Alpha"}]},
//!   "blog": {"topic": "choosing a standing desk"}
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::generate::{BlogRequest, ListingPage};
use crate::merge::PageEdits;

/// Everything a run changes, besides what configuration fixes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    /// Meta tags, JSON-LD and body fragments for the target page
    #[serde(flatten)]
    pub edits: PageEdits,

    /// Extra site paths listed in the sitemap after the target page
    #[serde(default)]
    pub sitemap_paths: Vec<String>,

    /// Let the LLM rewrite the page before the edits are merged
    #[serde(default)]
    pub llm_rewrite: bool,

    /// Blog post to generate
    #[serde(default)]
    pub blog: Option<BlogRequest>,

    /// Listing page to render
    #[serde(default)]
    pub listing: Option<ListingPage>,
}

impl EditPlan {
    /// Parse a plan from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a plan file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
