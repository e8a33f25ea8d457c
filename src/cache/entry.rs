// Cached repository snapshot.
// Serialized as `{ data: { ownRepos, forkRepos? }, timestamp }` under one fixed key.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::github::Repository;

use super::store::KeyValueStore;

/// Key the repository snapshot lives under.
pub const CACHE_KEY: &str = "github_repos_cache";

/// Default freshness window: 10 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// How long a snapshot stays in the store. Past its TTL it only serves as a stale fallback.
pub const SNAPSHOT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Partitioned repository lists, each sorted by stars descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedData {
    pub own_repos: Vec<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_repos: Option<Vec<Repository>>,
}

/// Snapshot of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: FeedData,
    /// Unix milliseconds at fetch time.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(data: FeedData, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// Age relative to `now_millis`; entries from the future count as age zero.
    pub fn age(&self, now_millis: i64) -> Duration {
        let millis = now_millis.saturating_sub(self.timestamp).max(0);
        Duration::from_millis(millis as u64)
    }

    /// Fresh while `now - timestamp < ttl`.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        self.age(now_millis) < ttl
    }
}

/// Read the snapshot under `key`. Unreadable or malformed entries read as absent.
pub fn read_entry(store: &dyn KeyValueStore, key: &str) -> Option<CacheEntry> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "cache read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed cache entry");
            None
        }
    }
}

/// Write the snapshot under `key`, replacing whatever was there.
pub fn write_entry(
    store: &dyn KeyValueStore,
    key: &str,
    entry: &CacheEntry,
    max_age: Duration,
) -> Result<()> {
    let json = serde_json::to_string(entry)?;
    store.set(key, &json, max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::{Clock, ManualClock};
    use crate::cache::store::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn repo(name: &str, stars: u64) -> Repository {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "stargazers_count": stars,
            "html_url": format!("https://github.com/uwuclxdy/{}", name),
        }))
        .unwrap()
    }

    #[test]
    fn test_serialized_shape() {
        let entry = CacheEntry::new(
            FeedData {
                own_repos: vec![repo("a", 1)],
                fork_repos: None,
            },
            1_700_000_000_000,
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value["data"]["ownRepos"].is_array());
        assert!(value["data"].get("forkRepos").is_none());
        assert_eq!(value["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_freshness_boundary() {
        let ttl = DEFAULT_TTL;
        let entry = CacheEntry::new(FeedData::default(), 0);
        let ttl_ms = ttl.as_millis() as i64;

        assert!(entry.is_fresh(ttl_ms - 1, ttl));
        assert!(!entry.is_fresh(ttl_ms, ttl));
    }

    #[test]
    fn test_eleven_minutes_old_is_expired() {
        let now = Utc::now().timestamp_millis();
        let entry = CacheEntry::new(FeedData::default(), now - 11 * 60 * 1000);
        assert!(!entry.is_fresh(now, DEFAULT_TTL));
    }

    #[test]
    fn test_read_write_round_trip() {
        let clock = ManualClock::new(Utc::now());
        let store = MemoryStore::new(Arc::new(clock.clone()));
        let entry = CacheEntry::new(
            FeedData {
                own_repos: vec![repo("b", 20), repo("a", 5)],
                fork_repos: Some(vec![]),
            },
            clock.now_millis(),
        );

        write_entry(&store, CACHE_KEY, &entry, DEFAULT_TTL).unwrap();
        assert_eq!(read_entry(&store, CACHE_KEY), Some(entry));
    }

    #[test]
    fn test_malformed_entry_reads_as_absent() {
        let store = MemoryStore::new(Arc::new(ManualClock::new(Utc::now())));
        store.set(CACHE_KEY, "not json", DEFAULT_TTL).unwrap();
        assert_eq!(read_entry(&store, CACHE_KEY), None);
    }
}
