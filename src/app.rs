// App state and main event loop.
// Owns the navigator and the feed, and routes keys and background results to them.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::feed::{
    FeedPipeline, FeedSource, LoadOutcome, RenderableFeed, UpstreamStars, spawn_upstream_lookups,
};
use crate::github::RateLimit;
use crate::nav::{
    ActivateOptions, Activation, AnimationSignals, Completion, FALLBACK_TIMEOUT, MemoryHistory,
    Navigator,
};
use crate::ui;

/// How long the outgoing section takes to slide out.
pub const EXIT_DURATION: Duration = Duration::from_millis(350);
/// How long the incoming section takes to slide in.
pub const ENTER_DURATION: Duration = Duration::from_millis(400);

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Loading state for async data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
}

impl<T> LoadingState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// Results delivered from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    FeedLoaded(LoadOutcome),
    Upstream(UpstreamStars),
    TransitionDone { id: u64, completion: Completion },
}

impl From<UpstreamStars> for AppEvent {
    fn from(update: UpstreamStars) -> Self {
        AppEvent::Upstream(update)
    }
}

/// Main application state.
pub struct App {
    pub nav: Navigator<MemoryHistory>,
    pub feed: LoadingState<RenderableFeed>,
    /// When the current cards were first shown; drives the entrance stagger.
    pub feed_shown_at: Option<Instant>,
    /// Vertical scroll of the active section.
    pub scroll: u16,
    pub should_quit: bool,
    signals: Option<AnimationSignals>,
    pipeline: Arc<FeedPipeline>,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    load_in_flight: bool,
}

impl App {
    pub fn new(pipeline: Arc<FeedPipeline>, nav: Navigator<MemoryHistory>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            nav,
            feed: LoadingState::Idle,
            feed_shown_at: None,
            scroll: 0,
            should_quit: false,
            signals: None,
            pipeline,
            tx,
            rx,
            load_in_flight: false,
        }
    }

    pub fn account(&self) -> &str {
        &self.pipeline.config().account
    }

    /// A feed load is running, including a refresh over cards already shown.
    pub fn is_refreshing(&self) -> bool {
        self.load_in_flight
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.pipeline.source().rate_limit()
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.reload_feed();

        while !self.should_quit {
            self.drain_events();
            self.animate();
            terminal.draw(|frame| ui::draw(frame, self))?;
            let heights = self.section_heights();
            self.nav.on_paint(&|id| heights.get(id).copied().unwrap_or(0));
            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.cycle_primary(1),
            KeyCode::BackTab => self.cycle_primary(-1),
            KeyCode::Right => self.step_secondary(1),
            KeyCode::Left => self.step_secondary(-1),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if let Some(key) = self.nav.config().primaries().get(index).map(|p| p.key.clone())
                {
                    self.open_primary(&key);
                }
            }
            KeyCode::Char('b') | KeyCode::Backspace => self.history_step(false),
            KeyCode::Char('f') => self.history_step(true),
            KeyCode::Char('r') => self.reload_feed(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
    }

    /// Start a feed load unless one is already running.
    pub fn reload_feed(&mut self) {
        if self.load_in_flight {
            return;
        }
        self.load_in_flight = true;
        if self.feed.data().is_none() {
            self.feed = LoadingState::Loading;
        }

        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = pipeline.load().await;
            let _ = tx.send(AppEvent::FeedLoaded(outcome));
        });
    }

    /// Apply everything background tasks have reported so far.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FeedLoaded(outcome) => {
                self.load_in_flight = false;
                let feed = RenderableFeed::build(&outcome, self.pipeline.config());
                info!(
                    source = ?feed.source,
                    cards = feed.own.len(),
                    forks = feed.forks.len(),
                    "feed ready"
                );
                self.feed = LoadingState::Loaded(feed);
                self.feed_shown_at = Some(Instant::now());

                if outcome.source != FeedSource::Unavailable {
                    spawn_upstream_lookups(
                        self.pipeline.source(),
                        outcome.forks_needing_upstream(),
                        self.tx.clone(),
                    );
                }
            }
            AppEvent::Upstream(update) => {
                if let LoadingState::Loaded(feed) = &mut self.feed {
                    if !feed.apply_upstream(&update) {
                        debug!(fork = %update.fork, "upstream result for a card no longer shown");
                    }
                }
            }
            AppEvent::TransitionDone { id, completion } => {
                if self.nav.complete(id, completion) {
                    self.scroll = 0;
                }
                if self.signals.as_ref().is_some_and(|s| s.id() == id) {
                    self.signals = None;
                }
            }
        }
    }

    /// Fire the animation-finished signals once each slide has run its course.
    pub fn animate(&mut self) {
        let Some(elapsed) = self.nav.transition().map(|t| t.started_at.elapsed()) else {
            return;
        };
        if let Some(signals) = self.signals.as_mut().filter(|s| !s.is_done()) {
            if elapsed >= EXIT_DURATION {
                signals.exit_finished();
            }
            if elapsed >= ENTER_DURATION {
                signals.enter_finished();
            }
        }
    }

    /// Natural height of every section as currently rendered.
    pub fn section_heights(&self) -> HashMap<String, u16> {
        self.nav
            .config()
            .sections()
            .iter()
            .map(|s| (s.id.clone(), ui::section_height(self, &s.id)))
            .collect()
    }

    pub fn activate(&mut self, target: &str, options: ActivateOptions) {
        let heights = self.section_heights();
        let activation = self
            .nav
            .activate(target, options, &|id| heights.get(id).copied().unwrap_or(0));
        self.follow(activation);
    }

    fn open_primary(&mut self, key: &str) {
        let heights = self.section_heights();
        let activation = self
            .nav
            .activate_primary(key, &|id| heights.get(id).copied().unwrap_or(0));
        self.follow(activation);
    }

    fn cycle_primary(&mut self, step: isize) {
        let primaries = self.nav.config().primaries();
        if primaries.is_empty() {
            return;
        }
        let current = primaries
            .iter()
            .position(|p| p.key == self.nav.tabs().active_primary)
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(primaries.len() as isize) as usize;
        let key = primaries[next].key.clone();
        self.open_primary(&key);
    }

    fn step_secondary(&mut self, step: isize) {
        let tabs = self.nav.tabs();
        if !tabs.secondary_visible() {
            return;
        }
        let current = tabs
            .secondary
            .iter()
            .position(|t| tabs.is_secondary_active(t))
            .map(|i| i as isize)
            .unwrap_or(-1);
        let next = current + step;
        if next < 0 || next as usize >= tabs.secondary.len() {
            return;
        }
        let target = tabs.secondary[next as usize].target.clone();
        self.activate(&target, ActivateOptions::default());
    }

    /// Move through history like a browser's back/forward buttons.
    /// Ignored mid-transition so history never drifts from the visible section.
    fn history_step(&mut self, forward: bool) {
        if self.nav.is_transitioning() {
            return;
        }
        let history = self.nav.history_mut();
        let path = if forward {
            history.forward()
        } else {
            history.back()
        };
        let Some(path) = path else {
            return;
        };

        let heights = self.section_heights();
        let activation = self
            .nav
            .on_history_navigated(&path, &|id| heights.get(id).copied().unwrap_or(0));
        self.follow(activation);
    }

    fn follow(&mut self, activation: Activation) {
        match activation {
            Activation::Started { token, signals } => {
                let id = token.id();
                if let Some(t) = self.nav.transition() {
                    debug!(id, from = %t.from, to = %t.to, direction = ?t.direction, "transition started");
                }
                self.signals = Some(signals);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let completion = token.wait(FALLBACK_TIMEOUT).await;
                    let _ = tx.send(AppEvent::TransitionDone { id, completion });
                });
            }
            Activation::Instant => {
                self.signals = None;
                self.scroll = 0;
            }
            Activation::Rejected(reason) => debug!(?reason, "navigation ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::cache::clock::ManualClock;
    use crate::feed::testing::{FakeSource, repo};
    use crate::feed::{FeedConfig, StarBadge};
    use crate::nav::SectionConfig;
    use crate::nav::history::History;
    use chrono::Utc;

    fn app(source: FakeSource) -> App {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let pipeline = Arc::new(FeedPipeline::new(
            Arc::new(source),
            store,
            clock,
            FeedConfig::default(),
        ));
        let nav = Navigator::new(SectionConfig::default(), MemoryHistory::default());
        App::new(pipeline, nav)
    }

    async fn next_event(app: &mut App) -> AppEvent {
        tokio::time::timeout(Duration::from_secs(2), app.rx.recv())
            .await
            .expect("timed out waiting for app event")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_feed_load_populates_cards() {
        let mut app = app(FakeSource::with_listing(vec![
            repo("a", 5),
            repo("b", 20),
            repo("uwuweb", 99),
        ]));
        app.reload_feed();
        assert!(matches!(app.feed, LoadingState::Loading));
        assert!(app.is_refreshing());

        let event = next_event(&mut app).await;
        app.handle_app_event(event);
        assert!(!app.is_refreshing());

        let feed = app.feed.data().unwrap();
        assert_eq!(feed.badge, StarBadge::Count(25));
        assert_eq!(feed.own.len(), 2);
        assert!(app.feed_shown_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_keeps_cards_and_reports_loading() {
        let mut app = app(FakeSource::with_listing(vec![repo("a", 5)]));
        app.reload_feed();
        let event = next_event(&mut app).await;
        app.handle_app_event(event);

        app.handle_key(KeyCode::Char('r'));
        assert!(app.is_refreshing());
        assert!(app.feed.data().is_some());

        let event = next_event(&mut app).await;
        app.handle_app_event(event);
        assert!(!app.is_refreshing());
    }

    #[tokio::test]
    async fn test_failed_load_shows_failure() {
        let mut app = app(FakeSource::failing());
        app.reload_feed();
        let event = next_event(&mut app).await;
        app.handle_app_event(event);

        let feed = app.feed.data().unwrap();
        assert_eq!(feed.source, FeedSource::Unavailable);
        assert_eq!(feed.badge, StarBadge::Failed);
    }

    #[tokio::test]
    async fn test_tab_key_transitions_and_completes() {
        let mut app = app(FakeSource::failing());
        app.handle_key(KeyCode::Tab);
        assert!(app.nav.is_transitioning());

        // A second request while animating is ignored.
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.nav.transition().unwrap().to, "osu-overview");

        let event = next_event(&mut app).await;
        assert!(matches!(
            event,
            AppEvent::TransitionDone {
                completion: Completion::TimedOut,
                ..
            }
        ));
        app.handle_app_event(event);
        assert_eq!(app.nav.current(), "osu-overview");
        assert_eq!(app.nav.history().current_path(), Some("/osu".to_string()));
    }

    #[tokio::test]
    async fn test_animation_signals_complete_transition() {
        let mut app = app(FakeSource::failing());
        app.handle_key(KeyCode::Tab);

        tokio::time::sleep(ENTER_DURATION + Duration::from_millis(20)).await;
        app.animate();

        let event = next_event(&mut app).await;
        assert!(matches!(
            event,
            AppEvent::TransitionDone {
                completion: Completion::BothSignaled,
                ..
            }
        ));
        app.handle_app_event(event);
        assert!(!app.nav.is_transitioning());
    }

    #[tokio::test]
    async fn test_history_back_returns_home() {
        let mut app = app(FakeSource::failing());
        app.handle_key(KeyCode::Char('2'));
        let event = next_event(&mut app).await;
        app.handle_app_event(event);
        assert_eq!(app.nav.current(), "osu-overview");

        app.handle_key(KeyCode::Backspace);
        let event = next_event(&mut app).await;
        app.handle_app_event(event);

        assert_eq!(app.nav.current(), "home");
        assert!(app.nav.history().can_go_forward());
    }

    #[test]
    fn test_stale_transition_result_ignored() {
        let mut app = app(FakeSource::failing());
        app.handle_app_event(AppEvent::TransitionDone {
            id: 42,
            completion: Completion::TimedOut,
        });
        assert_eq!(app.nav.current(), "home");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(FakeSource::failing());
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
