// Card view models for the repository feed.
// Turns a load outcome into ordered cards, a star badge, and the degraded-state flags.

use std::time::Duration;

use crate::github::Repository;

use super::filter::{apply_deny_list, total_stars};
use super::pipeline::{FeedConfig, FeedSource, LoadOutcome};
use super::upstream::UpstreamStars;

/// Entrance stagger between consecutive cards.
pub const CARD_STAGGER: Duration = Duration::from_millis(50);

/// Topic that marks a repository as vibecoded; shown as an accent, not a tag.
pub const VIBECODED_TOPIC: &str = "vibecoded";

const MAX_TOPICS: usize = 3;
const NO_DESCRIPTION: &str = "no description (oops)";
const FALLBACK_LANGUAGE_COLOR: &str = "#858585";

/// GitHub's colour for a language label.
pub fn language_color(language: &str) -> &'static str {
    match language {
        "Rust" => "#dea584",
        "JavaScript" => "#f1e05a",
        "TypeScript" => "#2b7489",
        "Python" => "#3572A5",
        "C#" => "#178600",
        "Java" => "#b07219",
        "Go" => "#00ADD8",
        "HTML" => "#e34c26",
        "CSS" => "#563d7c",
        "Shell" => "#89e051",
        "PHP" => "#4F5D95",
        "Kotlin" => "#A97BFF",
        "QML" => "#44a51c",
        "C" => "#555555",
        "C++" => "#f34b7d",
        _ => FALLBACK_LANGUAGE_COLOR,
    }
}

/// Aggregate star indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StarBadge {
    #[default]
    Loading,
    Count(u64),
    /// Nothing could be loaded; distinct from a count of zero.
    Failed,
}

/// A repository card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCard {
    pub name: String,
    pub description: String,
    pub stars: u64,
    /// Language label and its hex colour.
    pub language: Option<(String, &'static str)>,
    pub topics: Vec<String>,
    pub vibecoded: bool,
    pub url: String,
    /// Delay after the feed is shown before this card appears.
    pub entrance_delay: Duration,
}

impl RepoCard {
    pub fn new(repo: &Repository, index: usize) -> Self {
        let vibecoded = repo.topics.iter().any(|t| t == VIBECODED_TOPIC);
        let topics = repo
            .topics
            .iter()
            .filter(|t| *t != VIBECODED_TOPIC)
            .take(MAX_TOPICS)
            .cloned()
            .collect();

        Self {
            name: repo.name.clone(),
            description: repo
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            stars: repo.stargazers_count,
            language: repo
                .language
                .as_ref()
                .map(|l| (l.clone(), language_color(l))),
            topics,
            vibecoded,
            url: repo.html_url.clone(),
            entrance_delay: CARD_STAGGER * index as u32,
        }
    }

    /// Whether the card has finished its entrance `elapsed` after the feed appeared.
    pub fn is_visible(&self, elapsed: Duration) -> bool {
        elapsed >= self.entrance_delay
    }
}

/// Upstream star comparison for a tracked fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamState {
    Pending,
    Known(u64),
    /// Lookup failed or found nothing; the comparison is omitted.
    Unavailable,
}

/// A tracked fork card with its upstream comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkCard {
    pub card: RepoCard,
    pub upstream_name: Option<String>,
    pub upstream: UpstreamState,
}

/// Everything the projects view needs to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableFeed {
    pub source: FeedSource,
    pub own: Vec<RepoCard>,
    pub forks: Vec<ForkCard>,
    pub badge: StarBadge,
    /// Profile link for the failure panel.
    pub profile_url: String,
    pub error: Option<String>,
}

impl RenderableFeed {
    /// Build cards from a load outcome, applying the deny-list to own repositories.
    pub fn build(outcome: &LoadOutcome, config: &FeedConfig) -> Self {
        let profile_url = config.profile_url();

        if outcome.source == FeedSource::Unavailable {
            return Self {
                source: FeedSource::Unavailable,
                own: Vec::new(),
                forks: Vec::new(),
                badge: StarBadge::Failed,
                profile_url,
                error: outcome.error.clone(),
            };
        }

        let shown = apply_deny_list(&outcome.data.own_repos, &config.deny_list);
        let badge = StarBadge::Count(total_stars(shown.iter().copied()));
        let own = shown
            .iter()
            .enumerate()
            .map(|(i, repo)| RepoCard::new(repo, i))
            .collect::<Vec<_>>();

        let forks = outcome
            .data
            .fork_repos
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, repo)| ForkCard {
                card: RepoCard::new(repo, own.len() + i),
                upstream_name: repo
                    .upstream()
                    .map(|u| u.full_name.clone().unwrap_or_else(|| u.name.clone())),
                upstream: match repo.embedded_upstream_stars() {
                    Some(stars) => UpstreamState::Known(stars),
                    None => UpstreamState::Pending,
                },
            })
            .collect();

        Self {
            source: outcome.source,
            own,
            forks,
            badge,
            profile_url,
            error: outcome.error.clone(),
        }
    }

    /// Whether the cards come from a snapshot that may be out of date.
    pub fn is_stale(&self) -> bool {
        self.source == FeedSource::Stale
    }

    /// Apply an upstream lookup result to the fork card it belongs to.
    /// Returns false when no card with that name is shown.
    pub fn apply_upstream(&mut self, update: &UpstreamStars) -> bool {
        match self.forks.iter_mut().find(|f| f.card.name == update.fork) {
            Some(fork) => {
                fork.upstream = match update.stars {
                    Some(stars) => UpstreamState::Known(stars),
                    None => UpstreamState::Unavailable,
                };
                true
            }
            None => false,
        }
    }
}
