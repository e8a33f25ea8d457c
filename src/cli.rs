use std::path::PathBuf;

use clap::Parser;

use crate::feed::{DEFAULT_ACCOUNT, DEFAULT_FORK_MARKER};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Terminal portfolio - GitHub repository cards and page sections")]
#[command(version)]
pub struct Cli {
    /// GitHub account whose repositories are shown
    #[arg(long, env = "FOLIO_ACCOUNT", default_value = DEFAULT_ACCOUNT)]
    pub account: String,

    /// GitHub API base URL
    #[arg(long, env = "FOLIO_API_BASE", default_value = crate::github::GITHUB_API_BASE)]
    pub api_base: String,

    /// Repository names to hide (comma separated); defaults to the account's meta repos
    #[arg(long, env = "FOLIO_DENY", value_delimiter = ',')]
    pub deny: Option<Vec<String>>,

    /// Also show forks whose description contains the fork marker
    #[arg(long, env = "FOLIO_TRACK_FORKS")]
    pub track_forks: bool,

    /// Description marker that opts a fork into the feed
    #[arg(long, env = "FOLIO_FORK_MARKER", default_value = DEFAULT_FORK_MARKER)]
    pub fork_marker: String,

    /// How long a cached repository list stays fresh, in seconds
    #[arg(long, env = "FOLIO_CACHE_TTL", default_value_t = 600)]
    pub cache_ttl_secs: u64,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, env = "FOLIO_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the repository cache in memory only
    #[arg(long)]
    pub memory_cache: bool,

    /// Page path to open, e.g. /osu
    #[arg(long, default_value = "/")]
    pub path: String,
}
