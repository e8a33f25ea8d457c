// Section navigation state machine.
// One active section, at most one animated transition in flight, history kept in sync.

use std::time::Instant;

use tracing::debug;

use super::history::History;
use super::sections::{Direction, SectionConfig, SecondaryTab, normalize_path};
use super::transition::{
    AnimationSignals, Completion, EnterAnimation, ExitAnimation, TransitionToken,
    animations_for, transition_pair,
};

/// Options for a section change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivateOptions {
    /// Switch immediately, abandoning any in-flight transition.
    pub skip_animation: bool,
    /// Do not touch history (it already shows the target).
    pub suppress_history: bool,
    /// Replace the current history entry instead of pushing.
    pub replace_history: bool,
}

/// Why an activation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownSection,
    InFlight,
    AlreadyActive,
}

/// Result of an activation request.
#[derive(Debug)]
pub enum Activation {
    /// Switched without animation; state and history are already final.
    Instant,
    /// A transition started. The renderer drives `signals`; whoever awaits
    /// `token` reports back through [`Navigator::complete`].
    Started {
        token: TransitionToken,
        signals: AnimationSignals,
    },
    Rejected(Rejection),
}

/// Height of the content viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    /// Sized by the active section's content.
    #[default]
    Natural,
    /// Pinned while a transition animates.
    Locked(u16),
}

/// A transition in progress.
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub direction: Direction,
    pub enter: EnterAnimation,
    pub exit: ExitAnimation,
    pub started_at: Instant,
    options: ActivateOptions,
    grown: bool,
}

/// Tab highlighting derived from the active section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    pub active_primary: String,
    pub active_section: String,
    /// Secondary tabs of the active group; empty hides the secondary bar.
    pub secondary: Vec<SecondaryTab>,
}

impl TabState {
    fn for_section(config: &SectionConfig, id: &str) -> Self {
        let primary = config.meta(id).primary.clone();
        let secondary = config
            .secondaries_of(&primary)
            .into_iter()
            .cloned()
            .collect();
        Self {
            active_primary: primary,
            active_section: id.to_string(),
            secondary,
        }
    }

    pub fn secondary_visible(&self) -> bool {
        !self.secondary.is_empty()
    }

    pub fn is_secondary_active(&self, tab: &SecondaryTab) -> bool {
        tab.target == self.active_section
    }
}

/// Owns the active section pointer and the single-flight transition guard.
pub struct Navigator<H: History> {
    config: SectionConfig,
    history: H,
    current: String,
    in_flight: Option<Transition>,
    viewport: Viewport,
    tabs: TabState,
    next_id: u64,
}

impl<H: History> Navigator<H> {
    /// Start on the section matching the history's current path, replacing
    /// that entry so no duplicate is created.
    pub fn new(config: SectionConfig, history: H) -> Self {
        let initial = config.section_for_path(history.current_path().as_deref().unwrap_or("/"));
        let tabs = TabState::for_section(&config, &initial);
        let mut nav = Self {
            config,
            history,
            current: initial.clone(),
            in_flight: None,
            viewport: Viewport::Natural,
            tabs,
            next_id: 1,
        };
        nav.change_instant(
            &initial,
            ActivateOptions {
                replace_history: true,
                ..ActivateOptions::default()
            },
        );
        nav
    }

    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.in_flight.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tabs(&self) -> &TabState {
        &self.tabs
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Request a move to `target`. `measure` reports a section's natural height.
    pub fn activate(
        &mut self,
        target: &str,
        options: ActivateOptions,
        measure: &dyn Fn(&str) -> u16,
    ) -> Activation {
        if !self.config.contains(target) {
            return Activation::Rejected(Rejection::UnknownSection);
        }

        if options.skip_animation {
            self.change_instant(target, options);
            return Activation::Instant;
        }

        if self.in_flight.is_some() {
            debug!(target, "transition already in flight, ignoring");
            return Activation::Rejected(Rejection::InFlight);
        }

        if target == self.current {
            return Activation::Rejected(Rejection::AlreadyActive);
        }

        let id = self.next_id;
        self.next_id += 1;

        self.viewport = Viewport::Locked(measure(&self.current));
        let direction = self.config.direction(&self.current, target);
        let (enter, exit) = animations_for(direction);
        let (token, signals) = transition_pair(id);

        debug!(id, from = %self.current, to = target, ?direction, "transition started");
        self.in_flight = Some(Transition {
            id,
            from: self.current.clone(),
            to: target.to_string(),
            direction,
            enter,
            exit,
            started_at: Instant::now(),
            options,
            grown: false,
        });

        Activation::Started { token, signals }
    }

    /// Open a primary tab's landing section.
    pub fn activate_primary(&mut self, key: &str, measure: &dyn Fn(&str) -> u16) -> Activation {
        match self.config.primary(key).map(|p| p.landing.clone()) {
            Some(landing) => self.activate(&landing, ActivateOptions::default(), measure),
            None => Activation::Rejected(Rejection::UnknownSection),
        }
    }

    /// Handle a back/forward move: history already shows `path`.
    pub fn on_history_navigated(
        &mut self,
        path: &str,
        measure: &dyn Fn(&str) -> u16,
    ) -> Activation {
        let target = self.config.section_for_path(path);
        self.activate(
            &target,
            ActivateOptions {
                suppress_history: true,
                ..ActivateOptions::default()
            },
            measure,
        )
    }

    /// First paint after a start: grow the viewport to the incoming section.
    pub fn on_paint(&mut self, measure: &dyn Fn(&str) -> u16) {
        if let Some(transition) = self.in_flight.as_mut() {
            if !transition.grown {
                transition.grown = true;
                self.viewport = Viewport::Locked(measure(&transition.to));
            }
        }
    }

    /// Finish transition `id`. Only the in-flight transition completes, and only once.
    pub fn complete(&mut self, id: u64, completion: Completion) -> bool {
        if self.in_flight.as_ref().map(|t| t.id) != Some(id) {
            return false;
        }
        let Some(transition) = self.in_flight.take() else {
            return false;
        };

        debug!(id, to = %transition.to, ?completion, "transition complete");
        self.finalize(&transition.to);
        self.sync_history(&transition.to, transition.options);
        self.viewport = Viewport::Natural;
        true
    }

    fn change_instant(&mut self, target: &str, options: ActivateOptions) {
        self.in_flight = None;
        self.finalize(target);
        self.sync_history(target, options);
        self.viewport = Viewport::Natural;
    }

    fn finalize(&mut self, target: &str) {
        self.current = target.to_string();
        self.tabs = TabState::for_section(&self.config, target);
    }

    fn sync_history(&mut self, target: &str, options: ActivateOptions) {
        if options.suppress_history {
            return;
        }
        let Some(current_path) = self.history.current_path() else {
            return;
        };

        let desired = self.config.route_for(target);
        if normalize_path(&current_path) == desired {
            return;
        }
        if options.replace_history {
            self.history.replace(&desired);
        } else {
            self.history.push(&desired);
        }
    }
}
