//! # Content Generator Module
//!
//! Produces the documents a run can publish next to the edited page. Blog
//! posts and page rewrites come from an LLM; listing pages are rendered from
//! fixed entries.
//!
//! ## Key Components
//!
//! - `Completer`: Prompt-in, text-out model seam injected into the pipeline
//! - `BlogRequest` / `generate_blog_post`: Markdown post linking to the page
//! - `rewrite_page`: Replaces page HTML with the model's version before merging
//! - `ListingPage` / `render_listing_page`: Static HTML listing via pulldown-cmark

mod error;
mod listing;
mod llm;

pub use error::GenerateError;
pub use listing::{ListingEntry, ListingPage, render_listing_page};
pub use llm::{BlogRequest, generate_blog_post, rewrite_page, strip_code_fences};

use async_trait::async_trait;

/// A thing that can complete a prompt
#[async_trait]
pub trait Completer: Send + Sync {
    /// Send a single prompt and return the model's text verbatim
    async fn complete(&self, prompt: &str) -> Result<String, GenerateError>;
}
