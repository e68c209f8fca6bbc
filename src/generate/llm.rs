//! LLM-backed generators

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::{Completer, GenerateError};

fn default_words() -> u32 {
    300
}

fn default_blog_path() -> String {
    "blog/post.md".to_string()
}

/// A blog post the model should write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRequest {
    /// What the post is about
    pub topic: String,

    /// Approximate length in words
    #[serde(default = "default_words")]
    pub words: u32,

    /// Repository path the markdown is written to
    #[serde(default = "default_blog_path")]
    pub path: String,
}

/// Ask the model for a markdown blog post that links to `target_url`
///
/// # Arguments
///
/// * `completer` - The model
/// * `request` - Topic, length and destination
/// * `target_url` - Page the post should link to
///
/// # Returns
///
/// The post body, used verbatim
#[instrument(skip(completer))]
pub async fn generate_blog_post(
    completer: &dyn Completer,
    request: &BlogRequest,
    target_url: &str,
) -> Result<String, GenerateError> {
    let prompt = format!(
        "Write a {}-word blog post in Markdown about {}. Link to {} where it fits naturally. \
         Reply with the post only.",
        request.words, request.topic, target_url
    );

    let post = completer.complete(&prompt).await?;
    let post = strip_code_fences(&post).trim().to_string();
    if post.is_empty() {
        return Err(GenerateError::EmptyResponse(request.path.clone()));
    }

    trace!("Generated blog post of length {}", post.len());
    Ok(post)
}

/// Ask the model to add JSON-LD and meta tags to a page
///
/// The reply replaces the page markup; the merge engine still runs on it
/// afterwards so the plan's own tags win.
#[instrument(skip(completer, html), fields(html_len = html.len()))]
pub async fn rewrite_page(
    completer: &dyn Completer,
    html: &str,
    target_url: &str,
) -> Result<String, GenerateError> {
    debug!("Requesting page rewrite for {}", target_url);

    let prompt = format!(
        "Add JSON-LD structured data and meta tags to this HTML page for {}. \
         Keep all existing content. Reply with the complete HTML document only.\n\n{}",
        target_url, html
    );

    let rewritten = completer.complete(&prompt).await?;
    let rewritten = strip_code_fences(&rewritten).trim().to_string();
    if rewritten.is_empty() {
        return Err(GenerateError::EmptyResponse(target_url.to_string()));
    }
    Ok(rewritten)
}

/// Remove a surrounding markdown code fence, if the reply has one
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (```html) on the opening line
    match body.split_once('\n') {
        Some((_, inner)) => inner,
        None => body,
    }
}
