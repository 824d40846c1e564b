use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::TransitionConfig;
use crate::error::Result;
use crate::reactive::{Scheduler, Signal, Subscription};
use crate::registry::GeometryRegistry;
use crate::transition::{Direction, MatchedOverlay, TransitionAnimator, TransitionState};
use crate::view::View;

use super::{ContentLayer, PresentationHost, PresentedScreen, TransitionContext, TransitionDelegate};

type DestinationBuilder = Box<dyn Fn(&TransitionState) -> Box<dyn View>>;

/// One presentation attempt, from building the modal until it is dismissed.
struct Cycle {
    state: TransitionState,
    _delegate: Rc<HeroDelegate>,
}

struct CoordinatorInner {
    host: Rc<dyn PresentationHost>,
    registry: GeometryRegistry,
    scheduler: Scheduler,
    config: TransitionConfig,
    is_presented: Signal<bool>,
    builder: DestinationBuilder,
    did_present: bool,
    dismissing: bool,
    cycle: Option<Cycle>,
}

enum Action {
    Present(PresentedScreen),
    Dismiss,
    Nothing,
}

/// Keeps an externally owned `is_presented` flag and the host's modal in step.
///
/// Flag becomes true with nothing presented: a destination screen is built
/// (caller content plus overlay, sharing a fresh [`TransitionState`]) and
/// handed to the host. Flag becomes false while presented: the host is asked
/// to dismiss. A dismissal started by the user through the host writes the
/// flag back to false.
pub struct PresentationCoordinator {
    inner: Rc<RefCell<CoordinatorInner>>,
    _flag: Subscription,
}

impl PresentationCoordinator {
    pub fn new<F, V>(
        host: Rc<dyn PresentationHost>,
        registry: GeometryRegistry,
        scheduler: Scheduler,
        is_presented: Signal<bool>,
        destination: F,
        config: TransitionConfig,
    ) -> Self
    where
        F: Fn(&TransitionState) -> V + 'static,
        V: View + 'static,
    {
        let inner = Rc::new(RefCell::new(CoordinatorInner {
            host,
            registry,
            scheduler,
            config,
            is_presented: is_presented.clone(),
            builder: Box::new(move |state| Box::new(destination(state))),
            did_present: false,
            dismissing: false,
            cycle: None,
        }));

        let weak = Rc::downgrade(&inner);
        let flag = is_presented.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                Self::sync_inner(&inner);
            }
        });

        let coordinator = Self { inner, _flag: flag };
        coordinator.sync();
        coordinator
    }

    /// Re-evaluate the flag against what is presented.
    pub fn sync(&self) {
        Self::sync_inner(&self.inner);
    }

    pub fn is_presented(&self) -> Signal<bool> {
        self.inner.borrow().is_presented.clone()
    }

    pub fn did_present(&self) -> bool {
        self.inner.borrow().did_present
    }

    pub fn is_dismissing(&self) -> bool {
        self.inner.borrow().dismissing
    }

    /// State of the cycle in flight, if any.
    pub fn state(&self) -> Option<TransitionState> {
        self.inner.borrow().cycle.as_ref().map(|c| c.state.clone())
    }

    fn sync_inner(inner: &Rc<RefCell<CoordinatorInner>>) {
        let action = {
            let mut coordinator = inner.borrow_mut();
            let wanted = coordinator.is_presented.get();
            if wanted && !coordinator.did_present && coordinator.cycle.is_none() {
                match coordinator.build_screen(Rc::downgrade(inner)) {
                    Ok(screen) => {
                        coordinator.did_present = true;
                        Action::Present(screen)
                    }
                    Err(err) => {
                        log::warn!("cannot build destination screen: {}", err);
                        Action::Nothing
                    }
                }
            } else if !wanted && coordinator.did_present && !coordinator.dismissing {
                coordinator.dismissing = true;
                Action::Dismiss
            } else {
                log::debug!(
                    "flag {} with did_present={} dismissing={}: nothing to do",
                    wanted,
                    coordinator.did_present,
                    coordinator.dismissing
                );
                Action::Nothing
            }
        };

        let host = inner.borrow().host.clone();
        match action {
            Action::Present(screen) => host.present(screen),
            Action::Dismiss => host.dismiss(),
            Action::Nothing => {}
        }
    }

    fn user_dismissed(inner: &Rc<RefCell<CoordinatorInner>>) {
        let flag = {
            let mut coordinator = inner.borrow_mut();
            if !coordinator.did_present {
                return;
            }
            coordinator.did_present = false;
            coordinator.dismissing = true;
            coordinator.is_presented.clone()
        };
        log::debug!("user is dismissing the modal");
        flag.set(false);
    }

    fn dismissed(inner: &Rc<RefCell<CoordinatorInner>>) {
        let (cycle, registry) = {
            let mut coordinator = inner.borrow_mut();
            coordinator.dismissing = false;
            coordinator.did_present = false;
            (coordinator.cycle.take(), coordinator.registry.clone())
        };
        registry.set_active(None);
        if let Some(cycle) = cycle {
            cycle.state.end_cycle();
        }
        log::debug!("cycle finished");
        // The flag may have flipped back while the modal was leaving
        Self::sync_inner(inner);
    }
}

impl CoordinatorInner {
    fn build_screen(&mut self, coordinator: Weak<RefCell<CoordinatorInner>>) -> Result<PresentedScreen> {
        let state = TransitionState::new();
        state.begin_cycle(self.registry.capture())?;

        let overlay = MatchedOverlay::new(
            state.clone(),
            self.scheduler.clone(),
            self.config.overlay_transition(),
        );
        let content = (self.builder)(&state);
        let delegate = Rc::new(HeroDelegate {
            state: state.clone(),
            overlay: overlay.clone(),
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
            coordinator,
            animator: RefCell::new(None),
        });

        self.registry.set_active(Some(state.clone()));
        self.cycle = Some(Cycle {
            state,
            _delegate: delegate.clone(),
        });

        Ok(PresentedScreen {
            content,
            content_layer: ContentLayer::default(),
            overlay,
            delegate,
        })
    }
}

/// Transition hooks handed to the host with each presented screen.
struct HeroDelegate {
    state: TransitionState,
    overlay: MatchedOverlay,
    scheduler: Scheduler,
    config: TransitionConfig,
    coordinator: Weak<RefCell<CoordinatorInner>>,
    animator: RefCell<Option<TransitionAnimator>>,
}

impl HeroDelegate {
    fn run(&self, direction: Direction, context: TransitionContext) {
        let animator = TransitionAnimator::new(
            direction,
            self.state.clone(),
            self.overlay.clone(),
            self.scheduler.clone(),
            self.config.clone(),
        );
        *self.animator.borrow_mut() = Some(animator.clone());
        animator.animate(context);
    }
}

impl TransitionDelegate for HeroDelegate {
    fn begin_present(&self, context: TransitionContext) {
        self.run(Direction::Present, context);
    }

    fn begin_dismiss(&self, context: TransitionContext) {
        let coordinator = self.coordinator.clone();
        let context = context.chain(move |finished| {
            if !finished {
                return;
            }
            if let Some(inner) = coordinator.upgrade() {
                PresentationCoordinator::dismissed(&inner);
            }
        });
        self.run(Direction::Dismiss, context);
    }

    fn will_dismiss_by_user(&self) {
        if let Some(inner) = self.coordinator.upgrade() {
            PresentationCoordinator::user_dismissed(&inner);
        }
    }
}
