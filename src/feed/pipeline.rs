// Repository feed pipeline.
// Cache check, single listing fetch, partition, cache write, and stale fallback.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::{
    CACHE_KEY, CacheEntry, Clock, DEFAULT_TTL, FeedData, KeyValueStore, SNAPSHOT_RETENTION,
    read_entry, write_entry,
};
use crate::error::Result;
use crate::github::{RepoSource, Repository};

use super::filter::partition;

/// Account whose repositories the feed shows by default.
pub const DEFAULT_ACCOUNT: &str = "uwuclxdy";

/// The account's own meta/config repositories, hidden from the feed.
pub const DEFAULT_DENY_LIST: &[&str] = &[
    "uwuclxdy",
    "uwuweb",
    "reverse-proxy-guide",
    "website",
    "rhysu",
];

/// Description marker that opts a fork into the feed.
pub const DEFAULT_FORK_MARKER: &str = "[tracked]";

/// Feed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub account: String,
    pub deny_list: Vec<String>,
    /// Marker for tracked forks; `None` disables the forks list entirely.
    pub fork_marker: Option<String>,
    pub ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            fork_marker: None,
            ttl: DEFAULT_TTL,
        }
    }
}

impl FeedConfig {
    /// Public profile page, linked from the failure panel.
    pub fn profile_url(&self) -> String {
        format!("https://github.com/{}", self.account)
    }
}

/// Where a load's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Fresh cache hit; no request was made.
    Cache,
    Network,
    /// Fetch failed; showing an expired snapshot.
    Stale,
    /// Fetch failed and no snapshot exists.
    Unavailable,
}

/// Result of one feed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub source: FeedSource,
    pub data: FeedData,
    /// Why the fetch failed, for degraded outcomes.
    pub error: Option<String>,
}

impl LoadOutcome {
    fn from_entry(source: FeedSource, entry: CacheEntry, error: Option<String>) -> Self {
        Self {
            source,
            data: entry.data,
            error,
        }
    }

    /// Tracked forks whose upstream star count has to be looked up separately.
    pub fn forks_needing_upstream(&self) -> Vec<Repository> {
        self.data
            .fork_repos
            .iter()
            .flatten()
            .filter(|r| r.embedded_upstream_stars().is_none())
            .cloned()
            .collect()
    }
}

/// Fetch-cache pipeline for one account.
///
/// Keeps the last snapshot it saw so a failed refresh can fall back to it
/// even after the store has evicted the entry.
pub struct FeedPipeline {
    source: Arc<dyn RepoSource>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: FeedConfig,
    last_snapshot: Mutex<Option<CacheEntry>>,
}

impl FeedPipeline {
    pub fn new(
        source: Arc<dyn RepoSource>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: FeedConfig,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            config,
            last_snapshot: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn source(&self) -> Arc<dyn RepoSource> {
        Arc::clone(&self.source)
    }

    /// Load the feed: fresh cache, else network, else stale snapshot, else unavailable.
    pub async fn load(&self) -> LoadOutcome {
        let now = self.clock.now_millis();
        let mut stale = None;

        if let Some(entry) = read_entry(self.store.as_ref(), CACHE_KEY) {
            if entry.is_fresh(now, self.config.ttl) {
                info!(
                    age_secs = entry.age(now).as_secs(),
                    "using cached repos data"
                );
                self.remember(&entry);
                return LoadOutcome::from_entry(FeedSource::Cache, entry, None);
            }

            warn!("cache expired, fetching fresh data");
            if let Err(e) = self.store.delete(CACHE_KEY) {
                warn!(error = %e, "failed to evict expired cache entry");
            }
            stale = Some(entry);
        }

        match self.fetch().await {
            Ok(data) => {
                let entry = CacheEntry::new(data, self.clock.now_millis());
                let max_age = self.config.ttl.max(SNAPSHOT_RETENTION);
                match write_entry(self.store.as_ref(), CACHE_KEY, &entry, max_age) {
                    Ok(()) => info!(
                        ttl_secs = self.config.ttl.as_secs(),
                        repos = entry.data.own_repos.len(),
                        "cached repos data"
                    ),
                    Err(e) => warn!(error = %e, "failed to cache repos data"),
                }
                self.remember(&entry);
                LoadOutcome::from_entry(FeedSource::Network, entry, None)
            }
            Err(e) => {
                error!(account = %self.config.account, error = %e, "failed to fetch repos");
                let message = e.to_string();
                match stale.or_else(|| self.last_snapshot()) {
                    Some(entry) => {
                        warn!("using stale cache as fallback");
                        LoadOutcome::from_entry(FeedSource::Stale, entry, Some(message))
                    }
                    None => LoadOutcome {
                        source: FeedSource::Unavailable,
                        data: FeedData::default(),
                        error: Some(message),
                    },
                }
            }
        }
    }

    /// One listing request, partitioned and sorted.
    async fn fetch(&self) -> Result<FeedData> {
        let repos = self.source.list_repos(&self.config.account).await?;
        Ok(partition(repos, self.config.fork_marker.as_deref()))
    }

    fn remember(&self, entry: &CacheEntry) {
        if let Ok(mut last) = self.last_snapshot.lock() {
            *last = Some(entry.clone());
        }
    }

    fn last_snapshot(&self) -> Option<CacheEntry> {
        self.last_snapshot.lock().ok().and_then(|last| last.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::cache::clock::ManualClock;
    use crate::feed::card::{RenderableFeed, StarBadge};
    use crate::feed::testing::{FakeSource, repo};
    use chrono::Utc;

    struct Harness {
        source: Arc<FakeSource>,
        store: Arc<MemoryStore>,
        clock: ManualClock,
        pipeline: FeedPipeline,
    }

    fn harness(source: FakeSource, config: FeedConfig) -> Harness {
        let source = Arc::new(source);
        let clock = ManualClock::new(Utc::now());
        let store = Arc::new(MemoryStore::new(Arc::new(clock.clone())));
        let pipeline = FeedPipeline::new(
            source.clone(),
            store.clone(),
            Arc::new(clock.clone()),
            config,
        );
        Harness {
            source,
            store,
            clock,
            pipeline,
        }
    }

    fn listing() -> Vec<Repository> {
        vec![repo("a", 5), repo("b", 20), repo("uwuweb", 99)]
    }

    #[tokio::test]
    async fn test_network_load_sorts_and_caches() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());

        let outcome = h.pipeline.load().await;
        assert_eq!(outcome.source, FeedSource::Network);
        let names: Vec<&str> = outcome.data.own_repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["uwuweb", "b", "a"]);

        let cached = read_entry(h.store.as_ref(), CACHE_KEY).unwrap();
        assert_eq!(cached.data, outcome.data);
        assert_eq!(cached.timestamp, h.clock.now_millis());
    }

    #[tokio::test]
    async fn test_fresh_cache_suppresses_network() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());

        let first = h.pipeline.load().await;
        h.clock.advance(chrono::Duration::minutes(9));
        let second = h.pipeline.load().await;

        assert_eq!(second.source, FeedSource::Cache);
        assert_eq!(second.data, first.data);
        assert_eq!(h.source.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());
        let old = CacheEntry::new(
            FeedData {
                own_repos: vec![repo("old", 1)],
                fork_repos: None,
            },
            h.clock.now_millis() - 11 * 60 * 1000,
        );
        write_entry(h.store.as_ref(), CACHE_KEY, &old, SNAPSHOT_RETENTION).unwrap();

        let outcome = h.pipeline.load().await;
        assert_eq!(outcome.source, FeedSource::Network);
        assert_eq!(h.source.list_calls(), 1);
        assert_ne!(outcome.data, old.data);
    }

    #[tokio::test]
    async fn test_expired_entry_used_as_stale_fallback() {
        let h = harness(FakeSource::failing(), FeedConfig::default());
        let old = CacheEntry::new(
            FeedData {
                own_repos: vec![repo("old", 7)],
                fork_repos: None,
            },
            h.clock.now_millis() - 11 * 60 * 1000,
        );
        write_entry(h.store.as_ref(), CACHE_KEY, &old, SNAPSHOT_RETENTION).unwrap();

        let outcome = h.pipeline.load().await;
        assert_eq!(outcome.source, FeedSource::Stale);
        assert_eq!(outcome.data, old.data);
        assert!(outcome.error.is_some());
        // Evicted on read even though it was reused.
        assert!(read_entry(h.store.as_ref(), CACHE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_after_ttl_serves_snapshot() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());
        let first = h.pipeline.load().await;

        h.clock.advance(chrono::Duration::minutes(10));
        h.source.set_failing();
        let second = h.pipeline.load().await;

        assert_eq!(second.source, FeedSource::Stale);
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn test_snapshot_outlives_ttl_across_restarts() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());
        let first = h.pipeline.load().await;

        // A new process with the same store, past the TTL, while GitHub is down.
        h.clock.advance(chrono::Duration::minutes(11));
        let restarted = FeedPipeline::new(
            Arc::new(FakeSource::failing()),
            h.store.clone(),
            Arc::new(h.clock.clone()),
            FeedConfig::default(),
        );
        let outcome = restarted.load().await;

        assert_eq!(outcome.source, FeedSource::Stale);
        assert_eq!(outcome.data, first.data);
    }

    #[tokio::test]
    async fn test_snapshot_dropped_after_retention() {
        let h = harness(FakeSource::with_listing(listing()), FeedConfig::default());
        h.pipeline.load().await;

        h.clock.advance(chrono::Duration::days(8));
        let restarted = FeedPipeline::new(
            Arc::new(FakeSource::failing()),
            h.store.clone(),
            Arc::new(h.clock.clone()),
            FeedConfig::default(),
        );
        assert_eq!(restarted.load().await.source, FeedSource::Unavailable);
    }

    #[tokio::test]
    async fn test_shape_violation_without_cache_is_unavailable() {
        let h = harness(FakeSource::shape_violation(), FeedConfig::default());

        let outcome = h.pipeline.load().await;
        assert_eq!(outcome.source, FeedSource::Unavailable);
        assert!(
            outcome
                .error
                .as_deref()
                .unwrap()
                .contains("Invalid response format")
        );

        let feed = RenderableFeed::build(&outcome, h.pipeline.config());
        assert_eq!(feed.badge, StarBadge::Failed);
    }

    #[tokio::test]
    async fn test_fork_tracking() {
        let mut tracked = repo("lazer", 3);
        tracked.fork = true;
        tracked.description = Some("patched client [tracked]".to_string());
        let mut untracked = repo("random-fork", 50);
        untracked.fork = true;

        let config = FeedConfig {
            fork_marker: Some(DEFAULT_FORK_MARKER.to_string()),
            ..FeedConfig::default()
        };
        let h = harness(
            FakeSource::with_listing(vec![repo("a", 1), tracked, untracked]),
            config,
        );

        let outcome = h.pipeline.load().await;
        let forks = outcome.data.fork_repos.as_ref().unwrap();
        assert_eq!(forks.len(), 1);
        assert_eq!(forks[0].name, "lazer");
        assert_eq!(outcome.forks_needing_upstream().len(), 1);
    }
}
