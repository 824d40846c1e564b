//! Timed present/dismiss animations.
//!
//! ```text
//! Idle -> AwaitingDestinations -> Animating -> Completed   (present)
//! Idle -------------------------> Animating -> Completed   (dismiss)
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::animation::Tween;
use crate::config::TransitionConfig;
use crate::error::HeroError;
use crate::presentation::TransitionContext;
use crate::reactive::{AnimationStatus, Scheduler, Subscription};
use crate::registry::FrameSet;
use crate::transition::{MatchedOverlay, StateChange, TransitionMode, TransitionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorPhase {
    Idle,
    AwaitingDestinations,
    Animating,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Present,
    Dismiss,
}

struct AnimatorInner {
    direction: Direction,
    phase: AnimatorPhase,
    state: TransitionState,
    overlay: MatchedOverlay,
    scheduler: Scheduler,
    config: TransitionConfig,
    context: Option<TransitionContext>,
    readiness: Option<Subscription>,
    fade: Tween<f32>,
    /// Seconds since the motion started
    elapsed: f32,
    /// Seconds spent waiting for destinations
    waited: f32,
    stall_warned: bool,
    starts: usize,
}

/// Drives one direction of a matched-geometry transition.
///
/// The animator moves `current_frames` between the two discrete frame sets
/// and cross-fades the real content; the overlay springs between the
/// discrete values on its own.
#[derive(Clone)]
pub struct TransitionAnimator {
    inner: Rc<RefCell<AnimatorInner>>,
}

impl TransitionAnimator {
    pub fn new(
        direction: Direction,
        state: TransitionState,
        overlay: MatchedOverlay,
        scheduler: Scheduler,
        config: TransitionConfig,
    ) -> Self {
        let fade = Tween::new(0.0, config.content_transition());
        Self {
            inner: Rc::new(RefCell::new(AnimatorInner {
                direction,
                phase: AnimatorPhase::Idle,
                state,
                overlay,
                scheduler,
                config,
                context: None,
                readiness: None,
                fade,
                elapsed: 0.0,
                waited: 0.0,
                stall_warned: false,
                starts: 0,
            })),
        }
    }

    pub fn direction(&self) -> Direction {
        self.inner.borrow().direction
    }

    pub fn phase(&self) -> AnimatorPhase {
        self.inner.borrow().phase
    }

    /// How many times the animator entered `Animating`; at most one.
    pub fn start_count(&self) -> usize {
        self.inner.borrow().starts
    }

    /// Current content cross-fade progress, 0.0 to 1.0.
    pub fn content_opacity(&self) -> f32 {
        self.inner.borrow().fade.current().clamp(0.0, 1.0)
    }

    /// Take over `context` and run the transition to completion.
    pub fn animate(&self, context: TransitionContext) {
        if self.phase() != AnimatorPhase::Idle {
            log::warn!("animator already used ({:?}); ignoring new context", self.phase());
            return;
        }
        match self.direction() {
            Direction::Present => self.begin_present(context),
            Direction::Dismiss => self.begin_dismiss(context),
        }
    }

    fn begin_present(&self, context: TransitionContext) {
        let state = {
            let mut animator = self.inner.borrow_mut();
            context.to.set_opacity(0.0);
            animator.overlay.show();
            animator.context = Some(context);
            animator.phase = AnimatorPhase::AwaitingDestinations;
            animator.state.clone()
        };

        if state.is_ready() {
            self.on_ready();
            return;
        }
        log::debug!("awaiting destinations {:?}", state.missing_destinations());

        let weak = Rc::downgrade(&self.inner);
        let subscription =
            state.once_when(StateChange::DESTINATIONS, TransitionState::is_ready, move |_| {
                if let Some(inner) = weak.upgrade() {
                    TransitionAnimator { inner }.on_ready();
                }
            });
        self.inner.borrow_mut().readiness = Some(subscription);
        self.watch_readiness();
    }

    fn begin_dismiss(&self, context: TransitionContext) {
        let state = {
            let mut animator = self.inner.borrow_mut();
            context.to.set_opacity(0.0);
            context.from.set_opacity(1.0);
            animator.overlay.show();
            animator.context = Some(context);
            animator.phase = AnimatorPhase::Animating;
            animator.starts += 1;
            animator.state.clone()
        };

        state.set_mode(TransitionMode::Dismissing);
        let start = state.destination_frames().unwrap_or_else(|| {
            log::warn!(
                "dismissing before destinations {:?} reported; morphing from source frames",
                state.missing_destinations()
            );
            state.source_frames()
        });
        Self::publish_frames(&state, start);
        self.post_motion();
    }

    /// Readiness edge of the present variant. Runs at most once.
    fn on_ready(&self) {
        let (state, readiness) = {
            let mut animator = self.inner.borrow_mut();
            if animator.phase != AnimatorPhase::AwaitingDestinations {
                return;
            }
            animator.phase = AnimatorPhase::Animating;
            animator.starts += 1;
            (animator.state.clone(), animator.readiness.take())
        };
        drop(readiness);
        log::debug!("destinations ready for {:?}", state.tracked_ids());

        Self::publish_frames(&state, state.source_frames());
        state.set_mode(TransitionMode::Presenting);
        self.post_motion();
    }

    // Destination frames captured in the same pass that mounted the screen
    // are not trustworthy, so the motion starts on the next tick.
    fn post_motion(&self) {
        let weak = Rc::downgrade(&self.inner);
        let scheduler = self.inner.borrow().scheduler.clone();
        scheduler.post(move || {
            if let Some(inner) = weak.upgrade() {
                TransitionAnimator { inner }.start_motion();
            }
        });
    }

    fn start_motion(&self) {
        let (state, direction, scheduler) = {
            let animator = self.inner.borrow();
            if animator.phase != AnimatorPhase::Animating {
                return;
            }
            (
                animator.state.clone(),
                animator.direction,
                animator.scheduler.clone(),
            )
        };

        let target = match direction {
            Direction::Present => state.destination_frames().unwrap_or_else(|| {
                log::warn!("destinations vanished before the motion started");
                state.source_frames()
            }),
            Direction::Dismiss => state.source_frames(),
        };
        log::debug!("{:?} motion starts toward {:?}", direction, target);
        state.set_animating(true);
        Self::publish_frames(&state, target);

        {
            let mut animator = self.inner.borrow_mut();
            animator.fade.set_immediate(0.0);
            animator.fade.animate_to(1.0);
            animator.elapsed = 0.0;
        }
        self.apply_opacity(0.0);

        let weak = Rc::downgrade(&self.inner);
        scheduler.add_animation(move |dt| match weak.upgrade() {
            Some(inner) => TransitionAnimator { inner }.step(dt),
            None => AnimationStatus::Finished,
        });
    }

    fn step(&self, dt: f32) -> AnimationStatus {
        let (progress, done) = {
            let mut animator = self.inner.borrow_mut();
            if animator.phase != AnimatorPhase::Animating {
                return AnimationStatus::Finished;
            }
            animator.fade.advance(dt);
            animator.elapsed += dt;
            (
                animator.fade.current().clamp(0.0, 1.0),
                animator.elapsed >= animator.config.duration,
            )
        };

        if done {
            self.inner.borrow_mut().fade.finish();
            self.apply_opacity(1.0);
            self.complete();
            AnimationStatus::Finished
        } else {
            self.apply_opacity(progress);
            AnimationStatus::Running
        }
    }

    fn apply_opacity(&self, progress: f32) {
        let animator = self.inner.borrow();
        if let Some(context) = &animator.context {
            context.to.set_opacity(progress);
            if animator.direction == Direction::Dismiss {
                context.from.set_opacity(1.0 - progress);
            }
        }
    }

    fn complete(&self) {
        let (context, state, overlay, readiness, direction) = {
            let mut animator = self.inner.borrow_mut();
            animator.phase = AnimatorPhase::Completed;
            (
                animator.context.take(),
                animator.state.clone(),
                animator.overlay.clone(),
                animator.readiness.take(),
                animator.direction,
            )
        };
        log::debug!("{:?} transition complete", direction);

        // The host may start the next transition on this overlay from
        // inside the completion, so settle everything first.
        state.set_animating(false);
        drop(readiness);
        overlay.hide();
        if let Some(context) = context {
            context.complete(true);
        }
    }

    fn watch_readiness(&self) {
        let weak = Rc::downgrade(&self.inner);
        let scheduler = self.inner.borrow().scheduler.clone();
        scheduler.add_animation(move |dt| match weak.upgrade() {
            Some(inner) => TransitionAnimator { inner }.watch_step(dt),
            None => AnimationStatus::Finished,
        });
    }

    fn watch_step(&self, dt: f32) -> AnimationStatus {
        let (state, waited, warn_now, timeout) = {
            let mut animator = self.inner.borrow_mut();
            if animator.phase != AnimatorPhase::AwaitingDestinations {
                return AnimationStatus::Finished;
            }
            animator.waited += dt;
            let warn_now =
                !animator.stall_warned && animator.waited >= animator.config.stall_warning_after;
            if warn_now {
                animator.stall_warned = true;
            }
            (
                animator.state.clone(),
                animator.waited,
                warn_now,
                animator.config.readiness_timeout,
            )
        };

        if warn_now {
            log::warn!(
                "destinations {:?} still missing after {:.2}s; overlay stays on top",
                state.missing_destinations(),
                waited
            );
        }

        match timeout {
            Some(limit) if waited >= limit => {
                let err = HeroError::ReadinessTimeout {
                    waited,
                    missing: state.missing_destinations(),
                };
                log::warn!("{}; snapping to final state", err);
                self.snap_to_end();
                AnimationStatus::Finished
            }
            _ => AnimationStatus::Running,
        }
    }

    /// Timeout fallback: jump straight to the presented state. Ids that never
    /// reported keep their source frame.
    fn snap_to_end(&self) {
        let (state, readiness) = {
            let mut animator = self.inner.borrow_mut();
            animator.phase = AnimatorPhase::Animating;
            animator.fade.finish();
            (animator.state.clone(), animator.readiness.take())
        };
        drop(readiness);

        let frames: FrameSet = state
            .source_frames()
            .into_iter()
            .map(|(id, frame)| {
                let frame = state.destination(&id).map_or(frame, |d| d.frame);
                (id, frame)
            })
            .collect();
        state.set_mode(TransitionMode::Presenting);
        Self::publish_frames(&state, frames);
        self.apply_opacity(1.0);
        self.complete();
    }

    fn publish_frames(state: &TransitionState, frames: FrameSet) {
        if let Err(err) = state.set_current_frames(frames) {
            log::warn!("rejected frame update: {}", err);
        }
    }
}
