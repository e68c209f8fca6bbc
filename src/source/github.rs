//! GitHub contents API client

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

use super::{RemoteFile, SourceControl, SourceError};
use crate::config::SiteConfig;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const GITHUB_API: &str = "https://api.github.com";

/// Source-control client for one repository branch on GitHub
#[derive(Clone)]
pub struct GitHubClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// Repository in `owner/name` form
    repo: String,

    /// Branch read from and committed to
    branch: String,

    /// Access token
    token: String,
}

#[cfg(test)]
impl GitHubClient {
    /// Set the base URL (for testing only)
    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubClient {
    /// Create a client for `repo` on `branch`
    pub fn new(
        repo: impl Into<String>,
        branch: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(format!("sitemeta/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: GITHUB_API.to_string(),
            repo: repo.into(),
            branch: branch.into(),
            token: token.into(),
        })
    }

    /// Create a client from the run configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self, SourceError> {
        Self::new(&config.repo, &config.branch, &config.token)
    }

    /// Build the contents URL for a repository path
    fn contents_url(&self, path: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SourceError::UnexpectedResponse("base URL cannot hold a path".to_string()))?;
            segments.pop_if_empty().push("repos");
            segments.extend(self.repo.split('/'));
            segments.push("contents");
            segments.extend(path.trim_start_matches('/').split('/'));
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), SourceError> {
        let body = WriteRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.branch,
            sha,
        };
        let request = self.authorize(self.client.put(self.contents_url(path)?).json(&body));

        debug!("Sending PUT request for {}", path);
        let response = request.send().await?;
        check_status(path, response).await.map(|_| ())
    }
}

/// Map non-success responses to errors
async fn check_status(path: &str, response: Response) -> Result<String, SourceError> {
    let status = response.status();
    let response_text = response.text().await?;

    if status.is_success() {
        return Ok(response_text);
    }

    error!("API error: {} - {}", status, response_text);
    match status {
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(SourceError::Conflict {
            path: path.to_string(),
            message: response_text,
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Auth(format!(
            "Invalid token or insufficient permissions: {}",
            response_text
        ))),
        _ => Err(SourceError::Api {
            status_code: status.as_u16(),
            message: response_text,
        }),
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    #[instrument(skip(self), level = "debug")]
    async fn read(&self, path: &str) -> Result<RemoteFile, SourceError> {
        let request = self
            .authorize(self.client.get(self.contents_url(path)?))
            .query(&[("ref", self.branch.as_str())]);

        debug!("Sending GET request for {}", path);
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} does not exist on {}", path, self.branch);
            return Ok(RemoteFile::NotFound);
        }

        let text = check_status(path, response).await?;
        let contents: ContentsResponse = serde_json::from_str(&text).map_err(|e| {
            SourceError::UnexpectedResponse(format!("Failed to parse contents of {}: {}", path, e))
        })?;

        // The API wraps base64 at 60 columns
        let packed: String = contents.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| SourceError::Decode(format!("{}: {}", path, e)))?;
        let content =
            String::from_utf8(bytes).map_err(|e| SourceError::Decode(format!("{}: {}", path, e)))?;

        Ok(RemoteFile::Found {
            content,
            sha: contents.sha,
        })
    }

    #[instrument(skip(self, content), level = "debug")]
    async fn create(&self, path: &str, content: &str, message: &str) -> Result<(), SourceError> {
        self.write(path, content, message, None).await
    }

    #[instrument(skip(self, content), level = "debug")]
    async fn update(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), SourceError> {
        self.write(path, content, message, Some(sha)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> GitHubClient {
        let mut client = GitHubClient::new("acme/site", "main", "test-token").unwrap();
        client.set_base_url(server.url());
        client
    }

    #[tokio::test]
    async fn test_read_found() {
        let mut server = Server::new_async().await;
        // Split the payload across lines the way the API does
        let encoded = STANDARD.encode("<html>hello</html>");
        let (a, b) = encoded.split_at(8);
        let mock = server
            .mock("GET", "/repos/acme/site/contents/index.html")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"content": format!("{}\n{}\n", a, b), "sha": "abc123"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let file = client(&server).read("index.html").await.unwrap();
        assert_eq!(
            file,
            RemoteFile::Found {
                content: "<html>hello</html>".to_string(),
                sha: "abc123".to_string()
            }
        );

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/site/contents/blog/post.md")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body("{\"message\": \"Not Found\"}")
            .create_async()
            .await;

        let file = client(&server).read("blog/post.md").await.unwrap();
        assert_eq!(file, RemoteFile::NotFound);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_sends_sha() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/site/contents/sitemap.xml")
            .match_body(Matcher::PartialJson(json!({
                "message": "chore: update sitemap",
                "content": STANDARD.encode("<urlset/>"),
                "branch": "main",
                "sha": "abc123"
            })))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client(&server)
            .update("sitemap.xml", "<urlset/>", "chore: update sitemap", "abc123")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_sha_is_conflict() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/site/contents/index.html")
            .with_status(409)
            .with_body("{\"message\": \"index.html does not match abc123\"}")
            .create_async()
            .await;

        let result = client(&server)
            .update("index.html", "x", "msg", "abc123")
            .await;
        assert!(matches!(result, Err(SourceError::Conflict { path, .. }) if path == "index.html"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_without_sha() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/repos/acme/site/contents/compare.html")
            .match_body(Matcher::Json(json!({
                "message": "feat: add listing",
                "content": STANDARD.encode("<p>x</p>"),
                "branch": "main"
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client(&server)
            .create("compare.html", "<p>x</p>", "feat: add listing")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_token_is_auth_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/acme/site/contents/index.html")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("{\"message\": \"Bad credentials\"}")
            .create_async()
            .await;

        let result = client(&server).read("index.html").await;
        assert!(matches!(result, Err(SourceError::Auth(_))));
    }
}
