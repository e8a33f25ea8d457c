// Repository feed.
// Fetches, caches and shapes the account's repositories into cards.

pub mod card;
pub mod filter;
pub mod pipeline;
pub mod upstream;

#[cfg(test)]
pub mod testing;

pub use card::{ForkCard, RenderableFeed, RepoCard, StarBadge, UpstreamState};
pub use pipeline::{
    DEFAULT_ACCOUNT, DEFAULT_DENY_LIST, DEFAULT_FORK_MARKER, FeedConfig, FeedPipeline,
    FeedSource, LoadOutcome,
};
pub use upstream::{UpstreamStars, spawn_upstream_lookups};
