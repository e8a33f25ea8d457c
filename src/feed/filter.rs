// List shaping for the repository feed.
// Partitioning into own/tracked forks, star ordering, and the deny-list.

use std::cmp::Reverse;

use crate::cache::FeedData;
use crate::github::Repository;

/// Sort by star count, highest first. Equal counts keep their input order.
pub fn sort_by_stars(repos: &mut [Repository]) {
    repos.sort_by_key(|repo| Reverse(repo.stargazers_count));
}

/// Whether a fork has opted in for display via the marker in its description.
pub fn is_tracked_fork(repo: &Repository, marker: &str) -> bool {
    repo.fork
        && !marker.is_empty()
        && repo
            .description
            .as_deref()
            .is_some_and(|d| d.contains(marker))
}

/// Split a listing into own repositories and, when a marker is given, tracked forks.
pub fn partition(repos: Vec<Repository>, fork_marker: Option<&str>) -> FeedData {
    let (mut own_repos, forks): (Vec<_>, Vec<_>) = repos.into_iter().partition(|r| !r.fork);
    sort_by_stars(&mut own_repos);

    let fork_repos = fork_marker.map(|marker| {
        let mut tracked: Vec<Repository> = forks
            .into_iter()
            .filter(|r| is_tracked_fork(r, marker))
            .collect();
        sort_by_stars(&mut tracked);
        tracked
    });

    FeedData {
        own_repos,
        fork_repos,
    }
}

/// Drop repositories whose name is on the deny-list. Empty deny entries match nothing.
pub fn apply_deny_list<'a>(repos: &'a [Repository], deny: &[String]) -> Vec<&'a Repository> {
    repos
        .iter()
        .filter(|repo| !deny.iter().any(|d| !d.is_empty() && *d == repo.name))
        .collect()
}

/// Sum of star counts.
pub fn total_stars<'a>(repos: impl IntoIterator<Item = &'a Repository>) -> u64 {
    repos.into_iter().map(|r| r.stargazers_count).sum()
}
