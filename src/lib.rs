//! # sitemeta - Head Metadata, Sitemap and Recrawl Automation for Static Sites
//!
//! This crate keeps the SEO-relevant parts of a static site current. A run
//! reads one page from the site's repository, merges meta tags, JSON-LD and
//! body fragments into it, commits the result, regenerates the sitemap and
//! asks search engines to recrawl.
//!
//! ## Features
//!
//! - Idempotent merge of `<meta>` tags and JSON-LD blocks into any HTML document
//! - Create-or-update publishing through the GitHub contents API
//! - Sitemap generation in the sitemaps.org format
//! - Best-effort recrawl submission to Bing, Google and IndexNow
//! - Optional LLM-written blog posts and page rewrites, rate limited
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitemeta::config::SiteConfig;
//! use sitemeta::notify::notifiers_from_config;
//! use sitemeta::pipeline::Pipeline;
//! use sitemeta::plan::EditPlan;
//! use sitemeta::source::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SiteConfig::from_env()?;
//!     let store = GitHubClient::from_config(&config)?;
//!     let notifiers = notifiers_from_config(&config);
//!
//!     let plan = EditPlan::load("plan.json")?;
//!     let report = Pipeline::new(&config, &store)
//!         .with_notifiers(&notifiers)
//!         .run(&plan)
//!         .await?;
//!
//!     println!("{} files published", report.published.len());
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod config;
pub mod generate;
pub mod merge;
pub mod notify;
pub mod pipeline;
pub mod plan;
pub mod publish;
pub mod sitemap;
pub mod source;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
