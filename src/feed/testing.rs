// In-memory repository source for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{FolioError, Result};
use crate::github::{OwnerRef, RepoSource, Repository, UpstreamRef};

pub fn repo(name: &str, stars: u64) -> Repository {
    Repository {
        name: name.to_string(),
        description: None,
        fork: false,
        stargazers_count: stars,
        language: None,
        topics: Vec::new(),
        html_url: format!("https://github.com/uwuclxdy/{}", name),
        url: format!("https://api.github.com/repos/uwuclxdy/{}", name),
        source: None,
        parent: None,
    }
}

pub fn upstream_ref(owner: &str, name: &str, stars: Option<u64>) -> UpstreamRef {
    UpstreamRef {
        name: name.to_string(),
        full_name: None,
        owner: Some(OwnerRef {
            login: owner.to_string(),
        }),
        stargazers_count: stars,
    }
}

enum Listing {
    Repos(Vec<Repository>),
    Failing,
    ShapeViolation,
}

pub struct FakeSource {
    listing: Mutex<Listing>,
    details: HashMap<String, Repository>,
    repos: HashMap<(String, String), Repository>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeSource {
    fn new(listing: Listing) -> Self {
        Self {
            listing: Mutex::new(listing),
            details: HashMap::new(),
            repos: HashMap::new(),
            list_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_listing(repos: Vec<Repository>) -> Self {
        Self::new(Listing::Repos(repos))
    }

    pub fn failing() -> Self {
        Self::new(Listing::Failing)
    }

    pub fn shape_violation() -> Self {
        Self::new(Listing::ShapeViolation)
    }

    /// Serve `repo` from its own `url`.
    pub fn with_detail(mut self, repo: Repository) -> Self {
        self.details.insert(repo.url.clone(), repo);
        self
    }

    /// Serve `repo` from `/repos/{owner}/{repo.name}`.
    pub fn with_repo(mut self, owner: &str, repo: Repository) -> Self {
        self.repos
            .insert((owner.to_string(), repo.name.clone()), repo);
        self
    }

    pub fn set_failing(&self) {
        *self.listing.lock().unwrap() = Listing::Failing;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepoSource for FakeSource {
    async fn list_repos(&self, _account: &str) -> Result<Vec<Repository>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match &*self.listing.lock().unwrap() {
            Listing::Repos(repos) => Ok(repos.clone()),
            Listing::Failing => Err(FolioError::Other("connection refused".to_string())),
            Listing::ShapeViolation => Err(FolioError::InvalidResponse(
                "expected an array of repositories, got object".to_string(),
            )),
        }
    }

    async fn repo_by_url(&self, url: &str) -> Result<Repository> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| FolioError::NotFound(url.to_string()))
    }

    async fn repo(&self, owner: &str, name: &str) -> Result<Repository> {
        self.repos
            .get(&(owner.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| FolioError::NotFound(format!("{}/{}", owner, name)))
    }
}
