// Repository source abstraction.
// The feed pipeline talks to this trait so tests can swap the network out.

use async_trait::async_trait;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{RateLimit, Repository};

/// Read-only access to an account's repositories and upstream details.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// List the account's repositories in a single request.
    async fn list_repos(&self, account: &str) -> Result<Vec<Repository>>;

    /// Fetch a repository by its API detail URL.
    async fn repo_by_url(&self, url: &str) -> Result<Repository>;

    /// Fetch a repository by owner and name.
    async fn repo(&self, owner: &str, name: &str) -> Result<Repository>;

    /// Last known API quota, if the source tracks one.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_repos(&self, account: &str) -> Result<Vec<Repository>> {
        self.list_user_repos(account).await
    }

    async fn repo_by_url(&self, url: &str) -> Result<Repository> {
        self.get_repo_by_url(url).await
    }

    async fn repo(&self, owner: &str, name: &str) -> Result<Repository> {
        self.get_repo(owner, name).await
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        Some(GitHubClient::rate_limit(self))
    }
}
