// Transition completion.
// A token that resolves once both slide animations report done, or the fallback timer fires.

use std::time::Duration;

use tokio::sync::oneshot;

use super::sections::Direction;

/// Force-complete a transition if the animations have not both reported by then.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_millis(650);

/// How the incoming section slides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAnimation {
    SlideInFromRight,
    SlideInFromLeft,
}

/// How the outgoing section slides out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAnimation {
    SlideOutToLeft,
    SlideOutToRight,
}

/// Animation pair for a direction.
pub fn animations_for(direction: Direction) -> (EnterAnimation, ExitAnimation) {
    match direction {
        Direction::Forward => (EnterAnimation::SlideInFromRight, ExitAnimation::SlideOutToLeft),
        Direction::Backward => (EnterAnimation::SlideInFromLeft, ExitAnimation::SlideOutToRight),
    }
}

/// How a transition finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    BothSignaled,
    TimedOut,
}

/// Renderer side: fires once per animation.
#[derive(Debug)]
pub struct AnimationSignals {
    id: u64,
    enter: Option<oneshot::Sender<()>>,
    exit: Option<oneshot::Sender<()>>,
}

impl AnimationSignals {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn enter_finished(&mut self) {
        if let Some(tx) = self.enter.take() {
            let _ = tx.send(());
        }
    }

    pub fn exit_finished(&mut self) {
        if let Some(tx) = self.exit.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_done(&self) -> bool {
        self.enter.is_none() && self.exit.is_none()
    }
}

/// Awaitable side of a transition.
#[derive(Debug)]
pub struct TransitionToken {
    id: u64,
    enter: oneshot::Receiver<()>,
    exit: oneshot::Receiver<()>,
}

impl TransitionToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolve when both animations have signalled, or after `fallback`.
    /// A dropped signal never counts as done; only the timer can rescue it.
    pub async fn wait(self, fallback: Duration) -> Completion {
        let both = async {
            signalled(self.enter).await;
            signalled(self.exit).await;
        };
        match tokio::time::timeout(fallback, both).await {
            Ok(()) => Completion::BothSignaled,
            Err(_) => Completion::TimedOut,
        }
    }
}

async fn signalled(rx: oneshot::Receiver<()>) {
    if rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Create the paired token and signals for transition `id`.
pub fn transition_pair(id: u64) -> (TransitionToken, AnimationSignals) {
    let (enter_tx, enter_rx) = oneshot::channel();
    let (exit_tx, exit_rx) = oneshot::channel();
    (
        TransitionToken {
            id,
            enter: enter_rx,
            exit: exit_rx,
        },
        AnimationSignals {
            id,
            enter: Some(enter_tx),
            exit: Some(exit_tx),
        },
    )
}
