//! Sitemap document builder
//!
//! Produces a `urlset` document in the sitemap protocol namespace, one `<url>`
//! per input URL, in input order, each stamped with the run date.

use chrono::NaiveDate;
use quick_xml::se::to_string;
use serde::Serialize;
use thiserror::Error;

/// Namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Error type for sitemap serialization
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("XML serialization error: {0}")]
    Serialize(#[from] quick_xml::errors::serialize::SeError),
}

#[derive(Serialize, Debug)]
#[serde(rename = "urlset")]
struct UrlSet<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,

    #[serde(rename = "url")]
    urls: Vec<UrlEntry<'a>>,
}

#[derive(Serialize, Debug)]
struct UrlEntry<'a> {
    loc: &'a str,
    lastmod: String,
}

/// Build the sitemap XML for `urls`, all last modified on `as_of`
///
/// No de-duplication is done; the caller owns the list.
pub fn build_sitemap<S: AsRef<str>>(urls: &[S], as_of: NaiveDate) -> Result<String, SitemapError> {
    let lastmod = as_of.format("%Y-%m-%d").to_string();
    let set = UrlSet {
        xmlns: SITEMAP_NAMESPACE,
        urls: urls
            .iter()
            .map(|u| UrlEntry {
                loc: u.as_ref(),
                lastmod: lastmod.clone(),
            })
            .collect(),
    };
    let xml = to_string(&set)?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_two_urls_in_order() {
        let xml = build_sitemap(&["https://a/", "https://a/x"], date(2024, 1, 1)).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("<urlset xmlns=\"{}\">", SITEMAP_NAMESPACE)));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert_eq!(xml.matches("<lastmod>2024-01-01</lastmod>").count(), 2);

        let first = xml.find("<loc>https://a/</loc>").unwrap();
        let second = xml.find("<loc>https://a/x</loc>").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let urls = vec!["https://a/".to_string(), "https://a/".to_string()];
        let xml = build_sitemap(&urls, date(2025, 12, 31)).unwrap();

        assert_eq!(xml.matches("<loc>https://a/</loc>").count(), 2);
        assert!(xml.contains("<lastmod>2025-12-31</lastmod>"));
    }

    #[test]
    fn test_urls_are_escaped() {
        let xml = build_sitemap(&["https://a/?x=1&y=2"], date(2024, 6, 1)).unwrap();

        assert!(xml.contains("<loc>https://a/?x=1&amp;y=2</loc>"));
    }
}
