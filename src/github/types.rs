// GitHub API response types.
// Defines the repository shape returned by the public listing and detail endpoints.

use serde::{Deserialize, Serialize};

/// Owner of an upstream repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub login: String,
}

/// Upstream repository embedded in a fork's `source`/`parent` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRef {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
}

impl UpstreamRef {
    /// Owner and name of the upstream, from `full_name` or the owner login.
    pub fn owner_and_name(&self) -> Option<(String, String)> {
        if let Some((owner, name)) = self.full_name.as_deref().and_then(|f| f.split_once('/')) {
            return Some((owner.to_string(), name.to_string()));
        }
        self.owner
            .as_ref()
            .map(|owner| (owner.login.clone(), self.name.clone()))
    }
}

/// GitHub repository as returned by `/users/{account}/repos` and `/repos/{owner}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<UpstreamRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<UpstreamRef>,
}

impl Repository {
    /// The upstream this fork points at, preferring the root `source`.
    pub fn upstream(&self) -> Option<&UpstreamRef> {
        self.source.as_ref().or(self.parent.as_ref())
    }

    /// Star count of the upstream if the response already embeds it.
    pub fn embedded_upstream_stars(&self) -> Option<u64> {
        self.source
            .as_ref()
            .and_then(|s| s.stargazers_count)
            .or_else(|| self.parent.as_ref().and_then(|p| p.stargazers_count))
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
