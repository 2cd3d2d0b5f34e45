//! Repository listing.
//!
//! The clone core only needs a list of source locations; this module provides
//! the `SourceLister` seam, the GitHub REST implementation, and access token
//! resolution.

pub mod github;
pub mod token;

use async_trait::async_trait;

use crate::error::Result;

pub use github::{GITHUB_API_URL, GitHubConfig, GitHubLister, RepoSummary, next_page_url, public_clone_urls};
pub use token::{ENV_TOKEN_SENTINEL, TOKEN_ENV_VAR, resolve_token, resolve_token_with};

/// Lists the public source locations of an owner.
#[async_trait]
pub trait SourceLister: Send + Sync {
    async fn list_sources(&self, owner: &str, token: Option<&str>) -> Result<Vec<String>>;
}
