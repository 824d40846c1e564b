//! The matched-geometry transition engine.

pub mod animator;
pub mod overlay;
pub mod state;

pub use animator::{AnimatorPhase, Direction, TransitionAnimator};
pub use overlay::MatchedOverlay;
pub use state::{StateChange, TransitionMode, TransitionState};
