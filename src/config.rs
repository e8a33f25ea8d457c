// Runtime configuration.
// Validates command-line/env settings and resolves the cache location.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::paths;
use crate::cli::Cli;
use crate::error::{FolioError, Result};
use crate::feed::{DEFAULT_DENY_LIST, FeedConfig};

/// Where the repository snapshot is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    Directory(PathBuf),
    Memory,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub api_base: String,
    pub cache: CacheLocation,
    /// Directory for the log file, when one is available.
    pub log_dir: Option<PathBuf>,
    pub initial_path: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let account = cli.account.trim().to_string();
        if account.is_empty() || account.contains('/') {
            return Err(FolioError::Other(format!(
                "invalid account name: {:?}",
                cli.account
            )));
        }

        if cli.cache_ttl_secs == 0 {
            return Err(FolioError::Other(
                "cache TTL must be at least one second".to_string(),
            ));
        }

        let deny_list = cli
            .deny
            .unwrap_or_else(|| DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect())
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let fork_marker = if cli.track_forks {
            let marker = cli.fork_marker.trim();
            if marker.is_empty() {
                return Err(FolioError::Other(
                    "fork marker must not be empty when tracking forks".to_string(),
                ));
            }
            Some(marker.to_string())
        } else {
            None
        };

        let dir = cli.cache_dir.or_else(paths::cache_dir);
        let cache = match (&dir, cli.memory_cache) {
            (Some(dir), false) => CacheLocation::Directory(dir.clone()),
            _ => CacheLocation::Memory,
        };

        let initial_path = if cli.path.starts_with('/') {
            cli.path
        } else {
            format!("/{}", cli.path)
        };

        Ok(Self {
            feed: FeedConfig {
                account,
                deny_list,
                fork_marker,
                ttl: Duration::from_secs(cli.cache_ttl_secs),
            },
            api_base: cli.api_base,
            cache,
            log_dir: dir,
            initial_path,
        })
    }
}
