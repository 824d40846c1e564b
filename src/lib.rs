//! Matched-geometry ("hero") transitions between a presenting screen and a
//! modal screen.
//!
//! Elements tagged with the same [`registry::MatchId`] on both screens
//! appear to morph from one position and size to the other while the
//! modal opens and closes. Source screens publish their tagged elements
//! into a [`registry::GeometryRegistry`]; the modal reports its
//! destinations into a per-cycle [`transition::TransitionState`]; a
//! [`transition::MatchedOverlay`] draws proxies on top while a
//! [`transition::TransitionAnimator`] drives frames and content opacity.
//! [`presentation::PresentationCoordinator`] ties all of it to a single
//! boolean flag.
//!
//! Everything here is single-threaded and expected to run on the UI
//! thread. The frame loop is the host's: call
//! [`reactive::Scheduler::frame`] once per tick, or let
//! [`presentation::HeadlessHost::frame`] do layout and the tick together.

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod paint;
pub mod presentation;
pub mod reactive;
pub mod registry;
pub mod snapshot;
pub mod transition;
pub mod view;

pub mod prelude {
    pub use crate::animation::{SpringConfig, TimingFunction, Transition};
    pub use crate::config::TransitionConfig;
    pub use crate::error::{HeroError, Result};
    pub use crate::geometry::{Frame, Size};
    pub use crate::paint::{DrawCommand, PaintContext};
    pub use crate::presentation::{
        ContentLayer, HeadlessHost, PresentationCoordinator, PresentationHost, PresentedScreen,
        TransitionContext, TransitionDelegate,
    };
    pub use crate::reactive::{create_signal, Scheduler, Signal};
    pub use crate::registry::{GeometryRegistry, MatchId};
    pub use crate::snapshot::{Color, Paint, Snapshot};
    pub use crate::transition::{MatchedOverlay, TransitionMode, TransitionState};
    pub use crate::view::{DestinationElement, Fill, SourceElement, Stack, View};
}
