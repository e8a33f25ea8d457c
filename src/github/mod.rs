// GitHub API module.
// Client, endpoint helpers and response types for the public repository listing.

pub mod client;
pub mod endpoints;
pub mod source;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use source::RepoSource;
pub use types::*;
