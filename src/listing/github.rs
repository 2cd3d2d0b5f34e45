//! GitHub REST API repository listing.
//!
//! Lists `GET /users/{owner}/repos`, following `Link: rel="next"` pagination,
//! and keeps the clone URLs of public repositories.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use serde::Deserialize;

use super::SourceLister;
use crate::error::{ClonehubError, Result};

/// GitHub API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Largest page size the API accepts
const MAX_PER_PAGE: u32 = 100;

/// Configuration for the GitHub lister
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub user_agent: String,
    pub include_forks: bool,
    pub per_page: u32,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            include_forks: false,
            per_page: MAX_PER_PAGE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The fields of a repository object we care about.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepoSummary {
    pub clone_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
}

/// Keep the clone URLs of public repositories, optionally dropping forks.
pub fn public_clone_urls(repos: Vec<RepoSummary>, include_forks: bool) -> Vec<String> {
    repos
        .into_iter()
        .filter(|r| !r.private)
        .filter(|r| include_forks || !r.fork)
        .map(|r| r.clone_url)
        .collect()
}

/// Extract the `rel="next"` URL from a `Link` header value.
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let url = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if is_next {
            url.strip_prefix('<')
                .and_then(|u| u.strip_suffix('>'))
                .map(str::to_string)
        } else {
            None
        }
    })
}

/// Lists public repositories through the GitHub REST API.
pub struct GitHubLister {
    client: Client,
    config: GitHubConfig,
}

impl GitHubLister {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClonehubError::Listing(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured HTTP client; `config.user_agent` and `config.timeout` are not applied.
    pub fn with_client(client: Client, config: GitHubConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn first_page_url(&self, owner: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page={}",
            self.config.api_url.trim_end_matches('/'),
            owner,
            self.config.per_page.clamp(1, MAX_PER_PAGE)
        )
    }

    /// Fetch one page, returning its repositories and the next page URL.
    async fn fetch_page(&self, url: &str, token: Option<&str>) -> Result<(Vec<RepoSummary>, Option<String>)> {
        let mut request = self.client.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClonehubError::Listing(format!(
                "GET {} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_url);

        let body = response.text().await?;
        let repos: Vec<RepoSummary> = serde_json::from_str(&body)?;
        Ok((repos, next))
    }
}

#[async_trait]
impl SourceLister for GitHubLister {
    async fn list_sources(&self, owner: &str, token: Option<&str>) -> Result<Vec<String>> {
        if owner.trim().is_empty() {
            return Err(ClonehubError::InvalidConfig("username must not be empty".to_string()));
        }

        let mut sources = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.first_page_url(owner));

        while let Some(url) = next {
            if !visited.insert(url.clone()) {
                log::warn!("Pagination loops back to {}, stopping", url);
                break;
            }

            log::debug!("Fetching {}", url);
            let (repos, following) = self.fetch_page(&url, token).await?;
            log::debug!("Page returned {} repositories", repos.len());
            sources.extend(public_clone_urls(repos, self.config.include_forks));
            next = following;
        }

        log::info!("Found {} public repositories for {}", sources.len(), owner);
        Ok(sources)
    }
}
