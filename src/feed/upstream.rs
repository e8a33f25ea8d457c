// Upstream star lookups for tracked forks.
// Each lookup is its own task and reports back for exactly one card.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::github::{RepoSource, Repository};

/// Result of one upstream lookup, keyed by the fork's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamStars {
    pub fork: String,
    /// `None` when the upstream could not be determined.
    pub stars: Option<u64>,
}

/// Find the star count of the repository a fork was made from.
///
/// Tries the embedded reference, then the fork's own detail URL, then the
/// upstream repository itself. Failures are logged and yield `None`.
pub async fn resolve_upstream_stars(source: &dyn RepoSource, fork: &Repository) -> Option<u64> {
    if let Some(stars) = fork.embedded_upstream_stars() {
        return Some(stars);
    }

    let detail = if fork.url.is_empty() {
        None
    } else {
        match source.repo_by_url(&fork.url).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(fork = %fork.name, error = %e, "fork detail lookup failed");
                None
            }
        }
    };

    if let Some(stars) = detail.as_ref().and_then(|d| d.embedded_upstream_stars()) {
        return Some(stars);
    }

    let upstream = detail
        .as_ref()
        .and_then(|d| d.upstream())
        .or_else(|| fork.upstream())?;
    let (owner, name) = upstream.owner_and_name()?;

    match source.repo(&owner, &name).await {
        Ok(repo) => Some(repo.stargazers_count),
        Err(e) => {
            warn!(fork = %fork.name, upstream = %format!("{}/{}", owner, name), error = %e, "upstream lookup failed");
            None
        }
    }
}

/// Start one independent lookup per fork. Results arrive on `tx` in completion order.
pub fn spawn_upstream_lookups<T>(
    source: Arc<dyn RepoSource>,
    forks: Vec<Repository>,
    tx: UnboundedSender<T>,
) -> Vec<JoinHandle<()>>
where
    T: From<UpstreamStars> + Send + 'static,
{
    forks
        .into_iter()
        .map(|fork| {
            let source = Arc::clone(&source);
            let tx = tx.clone();
            tokio::spawn(async move {
                let stars = resolve_upstream_stars(source.as_ref(), &fork).await;
                debug!(fork = %fork.name, ?stars, "upstream lookup finished");
                // Receiver gone means the app is shutting down.
                let _ = tx.send(
                    UpstreamStars {
                        fork: fork.name,
                        stars,
                    }
                    .into(),
                );
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{FakeSource, repo, upstream_ref};

    fn fork(name: &str) -> Repository {
        let mut r = repo(name, 0);
        r.fork = true;
        r
    }

    #[tokio::test]
    async fn test_embedded_stars_skip_network() {
        let source = FakeSource::failing();
        let mut f = fork("osu");
        f.parent = Some(upstream_ref("ppy", "osu", Some(15000)));

        assert_eq!(resolve_upstream_stars(&source, &f).await, Some(15000));
        assert_eq!(source.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_detail_lookup_embeds_stars() {
        let f = fork("osu");
        let mut detail = f.clone();
        detail.source = Some(upstream_ref("ppy", "osu", Some(15000)));
        let source = FakeSource::failing().with_detail(detail);

        assert_eq!(resolve_upstream_stars(&source, &f).await, Some(15000));
        assert_eq!(source.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_falls_through_to_upstream_repo() {
        let f = fork("osu");
        let mut detail = f.clone();
        detail.parent = Some(upstream_ref("ppy", "osu", None));
        let upstream = repo("osu", 14000);
        let source = FakeSource::failing()
            .with_detail(detail)
            .with_repo("ppy", upstream);

        assert_eq!(resolve_upstream_stars(&source, &f).await, Some(14000));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_none() {
        let source = FakeSource::failing();
        assert_eq!(resolve_upstream_stars(&source, &fork("orphan")).await, None);
    }

    #[tokio::test]
    async fn test_spawned_lookups_report_each_fork() {
        let a = fork("a");
        let mut a_detail = a.clone();
        a_detail.source = Some(upstream_ref("x", "a", Some(3)));
        let source: Arc<dyn RepoSource> = Arc::new(FakeSource::failing().with_detail(a_detail));

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<UpstreamStars>();
        let handles = spawn_upstream_lookups(source, vec![a, fork("b")], tx);
        for handle in handles {
            handle.await.unwrap();
        }

        let mut results = Vec::new();
        while let Ok(update) = rx.try_recv() {
            results.push(update);
        }
        results.sort_by(|x, y| x.fork.cmp(&y.fork));
        assert_eq!(
            results,
            vec![
                UpstreamStars {
                    fork: "a".to_string(),
                    stars: Some(3)
                },
                UpstreamStars {
                    fork: "b".to_string(),
                    stars: None
                },
            ]
        );
    }
}
