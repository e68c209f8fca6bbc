//! # Site Configuration Module
//!
//! This module loads the run configuration from the process environment. The
//! configuration is built exactly once at start-up and then handed by
//! reference to every component of the pipeline.
//!
//! ## Key Components
//!
//! - `SiteConfig`: Repository, site and collaborator settings for one run
//! - `SiteConfigBuilder`: Builder pattern implementation for tests and embedding
//! - `LlmConfig` / `IndexNowConfig`: Optional collaborator credentials
//! - `ConfigError`: Reports every missing required variable at once
//!
//! ## Environment
//!
//! `GITHUB_REPO`, `GITHUB_TOKEN` and `TARGET_DOMAIN` are required. Everything
//! else has a default or switches an optional step off when absent.

use thiserror::Error;
use url::Url;

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required variables were absent or empty
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// A variable was present but could not be used
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Which hosted model backs the content generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Gemini,
}

impl LlmProvider {
    /// Model used when `LLM_MODEL` is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-3.5-turbo",
            LlmProvider::Gemini => "gemini-2.0-flash",
        }
    }
}

/// Credentials for the LLM collaborator
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
}

/// Credentials for the IndexNow submission protocol
#[derive(Debug, Clone)]
pub struct IndexNowConfig {
    /// Verification key published on the site
    pub key: String,

    /// URL of the key file; defaults to `<site>/<key>.txt`
    pub key_location: Option<String>,
}

/// Configuration for a single run
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Repository identifier in `owner/name` form
    pub repo: String,

    /// Access token for the source-control API
    pub token: String,

    /// Branch that receives commits
    pub branch: String,

    /// Public site base URL, without a trailing slash
    pub site_url: String,

    /// Public path of the page being edited, e.g. `/` or `/pricing.html`
    pub target_path: String,

    /// Repository path of the sitemap document
    pub sitemap_path: String,

    /// Deployment webhook fired after publishing
    pub deploy_hook: Option<String>,

    /// LLM collaborator, when a key is configured
    pub llm: Option<LlmConfig>,

    /// Bing Webmaster API key
    pub bing_api_key: Option<String>,

    /// IndexNow key, when configured
    pub indexnow: Option<IndexNowConfig>,

    /// Whether to ping Google with the sitemap URL
    pub google_ping: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            token: String::new(),
            branch: "main".to_string(),
            site_url: String::new(),
            target_path: "/".to_string(),
            sitemap_path: "sitemap.xml".to_string(),
            deploy_hook: None,
            llm: None,
            bing_api_key: None,
            indexnow: None,
            google_ping: false,
        }
    }
}

impl SiteConfig {
    /// Create a new builder
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::new()
    }

    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as absent. All missing required names are
    /// collected before returning so the operator sees them in one go.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut require = |name: &str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name.to_string());
            }
            value.unwrap_or_default()
        };

        let repo = require("GITHUB_REPO");
        let token = require("GITHUB_TOKEN");
        let domain = require("TARGET_DOMAIN");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        if !repo.contains('/') {
            return Err(ConfigError::Invalid {
                name: "GITHUB_REPO".to_string(),
                reason: format!("expected owner/name, got '{}'", repo),
            });
        }

        let site_url = site_url_from_domain(&domain)?;

        let mut target_path = get("TARGET_PATH").unwrap_or_else(|| "/".to_string());
        if !target_path.starts_with('/') {
            target_path.insert(0, '/');
        }

        let llm_key = match get("OPENAI_API_KEY") {
            Some(api_key) => Some((LlmProvider::OpenAi, api_key)),
            None => get("GEMINI_API_KEY").map(|api_key| (LlmProvider::Gemini, api_key)),
        };
        let llm = llm_key.map(|(provider, api_key)| LlmConfig {
            provider,
            api_key,
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
        });

        let indexnow = get("INDEXNOW_KEY").map(|key| IndexNowConfig {
            key,
            key_location: get("INDEXNOW_KEY_LOCATION"),
        });

        let google_ping = get("GOOGLE_PING")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            repo,
            token,
            branch: get("GITHUB_BRANCH").unwrap_or_else(|| "main".to_string()),
            site_url,
            target_path,
            sitemap_path: get("SITEMAP_PATH").unwrap_or_else(|| "sitemap.xml".to_string()),
            deploy_hook: get("NETLIFY_BUILD_HOOK"),
            llm,
            bing_api_key: get("BING_API_KEY"),
            indexnow,
            google_ping,
        })
    }

    /// Public URL of the edited page
    pub fn target_url(&self) -> String {
        format!("{}{}", self.site_url, self.target_path)
    }

    /// Public URL of a site-relative path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.site_url, path.trim_start_matches('/'))
    }

    /// Public URL of the sitemap document
    pub fn sitemap_url(&self) -> String {
        self.url_for(&self.sitemap_path)
    }

    /// Host name of the site, used by IndexNow
    pub fn host(&self) -> String {
        Url::parse(&self.site_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Repository path of the edited page
    ///
    /// `/` maps to `index.html`, and a trailing slash maps to the directory's
    /// `index.html`.
    pub fn page_path(&self) -> String {
        let trimmed = self.target_path.trim_start_matches('/');
        if trimmed.is_empty() {
            "index.html".to_string()
        } else if trimmed.ends_with('/') {
            format!("{}index.html", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}

fn site_url_from_domain(domain: &str) -> Result<String, ConfigError> {
    let candidate = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    };
    let parsed = Url::parse(&candidate).map_err(|e| ConfigError::Invalid {
        name: "TARGET_DOMAIN".to_string(),
        reason: e.to_string(),
    })?;
    if parsed.host_str().is_none() {
        return Err(ConfigError::Invalid {
            name: "TARGET_DOMAIN".to_string(),
            reason: "no host".to_string(),
        });
    }
    Ok(candidate.trim_end_matches('/').to_string())
}

/// Builder for SiteConfig
#[derive(Debug, Default)]
pub struct SiteConfigBuilder {
    config: SiteConfig,
}

impl SiteConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: SiteConfig::default(),
        }
    }

    /// Set the repository identifier
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.config.repo = repo.into();
        self
    }

    /// Set the source-control token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the branch
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = branch.into();
        self
    }

    /// Set the site base URL
    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.config.site_url = site_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the public path of the edited page
    pub fn target_path(mut self, target_path: impl Into<String>) -> Self {
        self.config.target_path = target_path.into();
        self
    }

    /// Set the repository path of the sitemap
    pub fn sitemap_path(mut self, sitemap_path: impl Into<String>) -> Self {
        self.config.sitemap_path = sitemap_path.into();
        self
    }

    /// Set the deployment webhook
    pub fn deploy_hook(mut self, deploy_hook: impl Into<String>) -> Self {
        self.config.deploy_hook = Some(deploy_hook.into());
        self
    }

    /// Set the LLM collaborator
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = Some(llm);
        self
    }

    /// Set the Bing API key
    pub fn bing_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.bing_api_key = Some(key.into());
        self
    }

    /// Set the IndexNow key
    pub fn indexnow(mut self, indexnow: IndexNowConfig) -> Self {
        self.config.indexnow = Some(indexnow);
        self
    }

    /// Enable or disable the Google sitemap ping
    pub fn google_ping(mut self, google_ping: bool) -> Self {
        self.config.google_ping = google_ping;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SiteConfig {
        self.config
    }
}
