use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ACCEPT};
use octocrab::service::middleware::retry::RetryConfig;
use serde::Deserialize;

use crate::error::OrgReposError;
use crate::org::{repos_route, OrgRef};

/// Media type for the v3 REST API.
pub const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// Status line and body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests against the GitHub REST API.
///
/// `route` is a path plus query relative to the API base, e.g.
/// `/orgs/kubernetes/repos?per_page=100`.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn get(&self, route: &str) -> Result<ApiResponse, OrgReposError>;
}

/// Unauthenticated octocrab client with a per-call timeout and no retries.
pub struct GithubApi {
    client: octocrab::Octocrab,
    timeout: Duration,
}

impl GithubApi {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, OrgReposError> {
        let client = octocrab::OctocrabBuilder::new()
            .base_uri(api_url)?
            .add_retry_config(RetryConfig::None)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl RepoSource for GithubApi {
    async fn get(&self, route: &str) -> Result<ApiResponse, OrgReposError> {
        let uri: http::Uri = route
            .parse()
            .map_err(|e| OrgReposError::InvalidRequest(format!("{}: {}", route, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_V3_JSON));

        let request = async {
            let response = self.client._get_with_headers(uri, Some(headers)).await?;
            let status = response.status().as_u16();

            // Non-200 bodies are read best-effort.
            let body = match self.client.body_to_string(response).await {
                Ok(body) => body,
                Err(_) if status != 200 => String::new(),
                Err(e) => return Err(OrgReposError::GitHub(e)),
            };
            Ok::<_, OrgReposError>(ApiResponse { status, body })
        };

        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| OrgReposError::Timeout(self.timeout))?
    }
}

/// The subset of a repository object this tool reports on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub private: bool,
}

/// Fetch one page of an organization's repositories and summarize them.
pub async fn list_repositories(
    source: &dyn RepoSource,
    org: &OrgRef,
    per_page: u32,
) -> Result<String, OrgReposError> {
    let slug = org.slug()?;
    let route = repos_route(&slug, per_page);
    tracing::debug!(org = %slug, route = %route, "Listing organization repositories");

    let response = source.get(&route).await?;
    if response.status != 200 {
        tracing::warn!(org = %slug, status = response.status, "GitHub API returned an error");
        return Err(OrgReposError::Upstream {
            status: response.status,
            body: response.body,
        });
    }

    let repos: Vec<Repository> = serde_json::from_str(&response.body)?;
    tracing::debug!(org = %slug, count = repos.len(), "Fetched repositories");

    Ok(format_summary(&slug, &repos))
}

/// Header line followed by one `Name: .., URL: ..` entry per repository, in
/// API order, with no separators between entries.
pub fn format_summary(org: &str, repos: &[Repository]) -> String {
    let mut text = format!("Repositories for organization {}:", org);
    for repo in repos {
        text.push_str(&format!("Name: {}, URL: {}", repo.name, repo.html_url));
    }
    text
}
