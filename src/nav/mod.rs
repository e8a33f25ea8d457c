// Section navigation.
// Section metadata, direction rules, history sync and the transition state machine.

pub mod history;
pub mod machine;
pub mod sections;
pub mod transition;

pub use history::MemoryHistory;
pub use machine::{ActivateOptions, Activation, Navigator, Viewport};
pub use sections::{HOME_SECTION, SectionConfig};
pub use transition::{AnimationSignals, Completion, EnterAnimation, ExitAnimation, FALLBACK_TIMEOUT};
