//! Listing pages rendered from fixed entries

use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};

fn default_listing_path() -> String {
    "compare.html".to_string()
}

/// One entry on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: String,
}

/// A static page listing entries in a fixed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Repository path, also the public path
    #[serde(default = "default_listing_path")]
    pub path: String,

    pub title: String,

    #[serde(default)]
    pub intro: Option<String>,

    pub entries: Vec<ListingEntry>,
}

impl ListingPage {
    /// The page as markdown
    fn to_markdown(&self) -> String {
        let mut markdown = format!("# {}\n\n", self.title);
        if let Some(intro) = &self.intro {
            markdown.push_str(intro);
            markdown.push_str("\n\n");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            let name = match &entry.url {
                Some(url) => format!("[{}]({})", entry.name, url),
                None => entry.name.clone(),
            };
            markdown.push_str(&format!("{}. **{}**", i + 1, name));
            if !entry.description.is_empty() {
                markdown.push_str(": ");
                markdown.push_str(&entry.description);
            }
            markdown.push('\n');
        }
        markdown
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a listing into a standalone HTML document
pub fn render_listing_page(listing: &ListingPage) -> String {
    let markdown = listing.to_markdown();
    let parser = Parser::new_ext(&markdown, Options::ENABLE_TABLES);

    let mut body = String::new();
    html::push_html(&mut body, parser);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_text(&listing.title),
        body
    )
}
