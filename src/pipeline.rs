//! # Pipeline Module
//!
//! Runs one pass over the site: read the target page, merge the plan's
//! edits, publish the page and any generated pages, rebuild the sitemap,
//! trigger a deploy and notify search engines.
//!
//! Every step is awaited in order. Errors from reading or writing the
//! repository end the run; the deploy hook and the notifiers only report.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::generate::{self, Completer, render_listing_page};
use crate::merge::merge_page;
use crate::notify::{Notification, Notifier, notify_all};
use crate::plan::EditPlan;
use crate::publish::{DeployHook, UpsertAction, upsert};
use crate::sitemap::build_sitemap;
use crate::source::{RemoteFile, SourceControl};

const PAGE_MESSAGE: &str = "chore: update head metadata";
const LISTING_MESSAGE: &str = "feat: update listing page";
const BLOG_MESSAGE: &str = "feat: update blog post";
const SITEMAP_MESSAGE: &str = "chore: update sitemap";

/// A file the run wrote to the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArtifact {
    pub path: String,
    pub action: UpsertAction,
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Files written, in the order they were committed
    pub published: Vec<PublishedArtifact>,

    /// URLs listed in the sitemap and submitted for recrawl
    pub urls: Vec<String>,

    /// Whether the deploy hook accepted the request, `None` when unconfigured
    pub deployed: Option<bool>,

    /// Per-notifier outcomes
    pub notifications: Vec<Notification>,
}

/// Sitemap URLs for a plan: site root, target page, extra paths, listing page
pub fn sitemap_urls(config: &SiteConfig, plan: &EditPlan) -> Vec<String> {
    let root = config.url_for("/");
    let target = config.target_url();

    let mut urls = vec![root.clone()];
    if target != root {
        urls.push(target);
    }
    for path in &plan.sitemap_paths {
        if path.starts_with("http://") || path.starts_with("https://") {
            urls.push(path.clone());
        } else {
            urls.push(config.url_for(path));
        }
    }
    if let Some(listing) = &plan.listing {
        urls.push(config.url_for(&listing.path));
    }
    urls
}

/// One configured run over the site
pub struct Pipeline<'a> {
    config: &'a SiteConfig,
    store: &'a dyn SourceControl,
    completer: Option<&'a dyn Completer>,
    notifiers: &'a [Box<dyn Notifier>],
    deploy_hook: Option<DeployHook>,
    today: NaiveDate,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a SiteConfig, store: &'a dyn SourceControl) -> Self {
        Self {
            config,
            store,
            completer: None,
            notifiers: &[],
            deploy_hook: config.deploy_hook.as_ref().map(DeployHook::new),
            today: chrono::Utc::now().date_naive(),
        }
    }

    pub fn with_completer(mut self, completer: &'a dyn Completer) -> Self {
        self.completer = Some(completer);
        self
    }

    pub fn with_notifiers(mut self, notifiers: &'a [Box<dyn Notifier>]) -> Self {
        self.notifiers = notifiers;
        self
    }

    pub fn with_deploy_hook(mut self, deploy_hook: Option<DeployHook>) -> Self {
        self.deploy_hook = deploy_hook;
        self
    }

    /// Date stamped on sitemap entries
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Execute the plan once
    #[instrument(skip_all, fields(repo = %self.config.repo, page = %self.config.page_path()))]
    pub async fn run(&self, plan: &EditPlan) -> Result<RunReport> {
        let mut report = RunReport::default();

        let page_path = self.config.page_path();
        let html = match self.store.read(&page_path).await? {
            RemoteFile::Found { content, .. } => content,
            RemoteFile::NotFound => return Err(Error::PageNotFound(page_path)),
        };

        let html = if plan.llm_rewrite {
            match self.completer {
                Some(completer) => {
                    generate::rewrite_page(completer, &html, &self.config.target_url()).await?
                }
                None => {
                    warn!("LLM rewrite requested but no model is configured");
                    html
                }
            }
        } else {
            html
        };

        let merged = merge_page(&html, &plan.edits);
        self.publish(&mut report, &page_path, &merged, PAGE_MESSAGE)
            .await?;

        if let Some(listing) = &plan.listing {
            let page = render_listing_page(listing);
            self.publish(&mut report, &listing.path, &page, LISTING_MESSAGE)
                .await?;
        }

        if let Some(request) = &plan.blog {
            match self.completer {
                Some(completer) => {
                    let post = generate::generate_blog_post(
                        completer,
                        request,
                        &self.config.target_url(),
                    )
                    .await?;
                    self.publish(&mut report, &request.path, &post, BLOG_MESSAGE)
                        .await?;
                }
                None => warn!("Blog post requested but no model is configured"),
            }
        }

        report.urls = sitemap_urls(self.config, plan);
        let sitemap = build_sitemap(&report.urls, self.today)?;
        self.publish(
            &mut report,
            &self.config.sitemap_path,
            &sitemap,
            SITEMAP_MESSAGE,
        )
        .await?;

        if let Some(hook) = &self.deploy_hook {
            report.deployed = Some(hook.trigger().await);
        }

        report.notifications =
            notify_all(self.notifiers, &self.config.site_url, &report.urls).await;

        info!(
            "Run finished: {} files published, {} notifiers",
            report.published.len(),
            report.notifications.len()
        );
        Ok(report)
    }

    async fn publish(
        &self,
        report: &mut RunReport,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<()> {
        let action = upsert(self.store, path, content, message).await?;
        report.published.push(PublishedArtifact {
            path: path.to_string(),
            action,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BlogRequest, GenerateError, ListingEntry, ListingPage};
    use crate::merge::MetaDirective;
    use crate::notify::Outcome;
    use crate::source::SourceError;
    use crate::source::memory::{Call, MemoryStore};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    const PAGE: &str = "<!DOCTYPE html><html><head><title>Desks</title></head><body><p>Hello</p></body></html>";

    fn config() -> SiteConfig {
        SiteConfig::builder()
            .repo("acme/site")
            .token("t")
            .site_url("https://example.com")
            .target_path("/desks.html")
            .build()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    struct Recording {
        name: &'static str,
        outcome: Outcome,
        seen: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl Recording {
        fn new(name: &'static str, outcome: Outcome) -> Self {
            Self {
                name,
                outcome,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Notifier for Recording {
        fn name(&self) -> &str {
            self.name
        }

        async fn notify(&self, _site_url: &str, urls: &[String]) -> Outcome {
            self.seen.lock().unwrap().push(urls.to_vec());
            self.outcome.clone()
        }
    }

    struct Echo;

    #[async_trait]
    impl Completer for Echo {
        async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerateError> {
            Ok(format!("# Post\n\n{}", prompt.len()))
        }
    }

    #[test]
    fn test_sitemap_urls_order() {
        let plan = EditPlan {
            sitemap_paths: vec!["/about.html".to_string(), "https://cdn.example.com/x".to_string()],
            listing: Some(ListingPage {
                path: "compare.html".to_string(),
                title: "T".to_string(),
                intro: None,
                entries: vec![],
            }),
            ..EditPlan::default()
        };

        assert_eq!(
            sitemap_urls(&config(), &plan),
            vec![
                "https://example.com/",
                "https://example.com/desks.html",
                "https://example.com/about.html",
                "https://cdn.example.com/x",
                "https://example.com/compare.html",
            ]
        );
    }

    #[test]
    fn test_root_target_listed_once() {
        let config = SiteConfig::builder()
            .site_url("https://example.com")
            .target_path("/")
            .build();
        assert_eq!(
            sitemap_urls(&config, &EditPlan::default()),
            vec!["https://example.com/"]
        );
    }

    #[tokio::test]
    async fn test_run_publishes_page_and_sitemap() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let plan = EditPlan {
            edits: crate::merge::PageEdits {
                meta: vec![MetaDirective::name("description", "Standing desks")],
                ..Default::default()
            },
            ..EditPlan::default()
        };

        let report = Pipeline::new(&config, &store)
            .with_date(date())
            .run(&plan)
            .await
            .unwrap();

        assert_eq!(
            report.published,
            vec![
                PublishedArtifact {
                    path: "desks.html".to_string(),
                    action: UpsertAction::Updated
                },
                PublishedArtifact {
                    path: "sitemap.xml".to_string(),
                    action: UpsertAction::Created
                },
            ]
        );
        let page = store.content("desks.html").unwrap();
        assert!(page.contains(r#"<meta name="description" content="Standing desks">"#));

        let sitemap = store.content("sitemap.xml").unwrap();
        assert!(sitemap.contains("<loc>https://example.com/desks.html</loc>"));
        assert!(sitemap.contains("<lastmod>2024-03-01</lastmod>"));
        assert_eq!(report.deployed, None);
    }

    #[tokio::test]
    async fn test_missing_page_ends_run() {
        let config = config();
        let store = MemoryStore::new();

        let result = Pipeline::new(&config, &store).run(&EditPlan::default()).await;

        assert!(matches!(result, Err(Error::PageNotFound(path)) if path == "desks.html"));
        assert_eq!(store.calls(), vec![Call::Read("desks.html".to_string())]);
    }

    #[tokio::test]
    async fn test_quota_exceeded_does_not_fail_run() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let bing = Recording::new("bing", Outcome::QuotaExceeded);
        let notifiers: Vec<Box<dyn Notifier>> = vec![
            Box::new(bing),
            Box::new(Recording::new("indexnow", Outcome::Success)),
        ];

        let report = Pipeline::new(&config, &store)
            .with_notifiers(&notifiers)
            .with_date(date())
            .run(&EditPlan::default())
            .await
            .unwrap();

        assert!(store.content("sitemap.xml").is_some());
        assert_eq!(report.notifications.len(), 2);
        assert_eq!(report.notifications[0].outcome, Outcome::QuotaExceeded);
        assert_eq!(report.notifications[1].outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_notifiers_receive_sitemap_urls() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let google = Recording::new("google", Outcome::Success);
        let seen = google.seen.clone();
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(google)];

        let report = Pipeline::new(&config, &store)
            .with_notifiers(&notifiers)
            .run(&EditPlan::default())
            .await
            .unwrap();

        assert_eq!(
            report.urls,
            vec!["https://example.com/", "https://example.com/desks.html"]
        );
        assert_eq!(*seen.lock().unwrap(), vec![report.urls.clone()]);
    }

    #[tokio::test]
    async fn test_generated_pages_are_published() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let plan = EditPlan {
            listing: Some(ListingPage {
                path: "compare.html".to_string(),
                title: "Compare".to_string(),
                intro: None,
                entries: vec![ListingEntry {
                    name: "Alpha".to_string(),
                    url: None,
                    description: String::new(),
                }],
            }),
            blog: Some(BlogRequest {
                topic: "desks".to_string(),
                words: 100,
                path: "blog/desks.md".to_string(),
            }),
            ..EditPlan::default()
        };

        let report = Pipeline::new(&config, &store)
            .with_completer(&Echo)
            .run(&plan)
            .await
            .unwrap();

        let paths: Vec<&str> = report.published.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["desks.html", "compare.html", "blog/desks.md", "sitemap.xml"]
        );
        assert!(store.content("compare.html").unwrap().contains("Alpha"));
        assert!(store.content("blog/desks.md").unwrap().starts_with("# Post"));
        assert!(report.urls.contains(&"https://example.com/compare.html".to_string()));
    }

    #[tokio::test]
    async fn test_blog_skipped_without_model() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let plan = EditPlan {
            blog: Some(BlogRequest {
                topic: "desks".to_string(),
                words: 100,
                path: "blog/desks.md".to_string(),
            }),
            ..EditPlan::default()
        };

        let report = Pipeline::new(&config, &store).run(&plan).await.unwrap();

        assert_eq!(report.published.len(), 2);
        assert!(store.content("blog/desks.md").is_none());
    }

    #[tokio::test]
    async fn test_second_run_is_stable() {
        let config = config();
        let store = MemoryStore::new();
        store.insert("desks.html", PAGE);
        let plan = EditPlan::from_json(
            r#"{
                "meta": [{"property": "og:title", "content": "Desks"}],
                "structured_data": [{"@type": "Organization", "name": "Acme"}],
                "fragments": [{"id": "banner", "html": "<p>Sale</p>"}]
            }"#,
        )
        .unwrap();
        let pipeline = Pipeline::new(&config, &store).with_date(date());

        pipeline.run(&plan).await.unwrap();
        let first = store.content("desks.html").unwrap();
        pipeline.run(&plan).await.unwrap();
        let second = store.content("desks.html").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches("id=\"banner\"").count(), 1);
    }

    struct Refusing;

    #[async_trait]
    impl SourceControl for Refusing {
        async fn read(&self, _path: &str) -> std::result::Result<RemoteFile, SourceError> {
            Ok(RemoteFile::Found {
                content: PAGE.to_string(),
                sha: "abc".to_string(),
            })
        }

        async fn create(
            &self,
            path: &str,
            _content: &str,
            _message: &str,
        ) -> std::result::Result<(), SourceError> {
            Err(SourceError::Conflict {
                path: path.to_string(),
                message: "exists".to_string(),
            })
        }

        async fn update(
            &self,
            path: &str,
            _content: &str,
            _message: &str,
            _sha: &str,
        ) -> std::result::Result<(), SourceError> {
            Err(SourceError::Conflict {
                path: path.to_string(),
                message: "sha mismatch".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_conflict_ends_run_before_notifying() {
        let config = config();
        let bing = Recording::new("bing", Outcome::Success);
        let seen = bing.seen.clone();
        let notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(bing)];

        let result = Pipeline::new(&config, &Refusing)
            .with_notifiers(&notifiers)
            .run(&EditPlan::default())
            .await;

        assert!(matches!(
            result,
            Err(Error::Source(SourceError::Conflict { .. }))
        ));
        assert!(seen.lock().unwrap().is_empty());
    }
}
