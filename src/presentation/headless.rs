//! In-process host with one root screen and a single modal slot.
//!
//! Useful wherever no windowing backend is attached: tests, demos, and
//! offscreen rendering. The frame loop is owned by the caller, who calls
//! [`HeadlessHost::frame`] once per tick.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::geometry::Frame;
use crate::paint::PaintContext;
use crate::reactive::Scheduler;
use crate::registry::GeometryRegistry;
use crate::transition::MatchedOverlay;
use crate::view::View;

use super::{ContentLayer, PresentationHost, PresentedScreen, TransitionContext};

#[derive(Default)]
struct ModalSlot {
    screen: Option<PresentedScreen>,
    /// A present or dismiss animation is running
    in_flight: bool,
    /// Dismiss requested while a presentation was still animating
    pending_dismiss: bool,
    present_calls: usize,
    dismiss_calls: usize,
}

pub struct HeadlessHost {
    this: Weak<HeadlessHost>,
    bounds: Frame,
    registry: GeometryRegistry,
    scheduler: Scheduler,
    root: RefCell<Box<dyn View>>,
    root_layer: ContentLayer,
    modal: RefCell<ModalSlot>,
}

impl HeadlessHost {
    pub fn new(
        bounds: Frame,
        registry: GeometryRegistry,
        scheduler: Scheduler,
        root: impl View + 'static,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            bounds,
            registry,
            scheduler,
            root: RefCell::new(Box::new(root)),
            root_layer: ContentLayer::default(),
            modal: RefCell::new(ModalSlot::default()),
        })
    }

    /// One tick: a layout pass over every screen, then deferred tasks and
    /// animations.
    pub fn frame(&self, dt: f32) {
        self.layout();
        self.scheduler.frame(dt);
    }

    pub fn layout(&self) {
        self.registry.begin_pass();
        self.root.borrow_mut().layout(self.bounds);
        if let Some(screen) = self.modal.borrow_mut().screen.as_mut() {
            screen.layout(self.bounds);
        }
    }

    pub fn paint(&self) -> PaintContext {
        let mut ctx = PaintContext::new();
        ctx.with_opacity(self.root_layer.opacity(), |ctx| self.root.borrow().paint(ctx));
        if let Some(screen) = self.modal.borrow().screen.as_ref() {
            screen.paint(&mut ctx);
        }
        ctx
    }

    /// Simulate the system dismiss gesture on the modal.
    pub fn user_dismiss(&self) {
        let delegate = {
            let modal = self.modal.borrow();
            match modal.screen.as_ref() {
                Some(screen) if !modal.in_flight => screen.delegate.clone(),
                _ => {
                    log::debug!("user dismiss ignored: no settled modal");
                    return;
                }
            }
        };
        delegate.will_dismiss_by_user();
        self.start_dismiss();
    }

    pub fn is_presenting(&self) -> bool {
        self.modal.borrow().screen.is_some()
    }

    pub fn is_transition_in_flight(&self) -> bool {
        self.modal.borrow().in_flight
    }

    pub fn present_calls(&self) -> usize {
        self.modal.borrow().present_calls
    }

    pub fn dismiss_calls(&self) -> usize {
        self.modal.borrow().dismiss_calls
    }

    pub fn root_opacity(&self) -> f32 {
        self.root_layer.opacity()
    }

    pub fn modal_opacity(&self) -> Option<f32> {
        self.modal
            .borrow()
            .screen
            .as_ref()
            .map(|s| s.content_layer.opacity())
    }

    pub fn overlay(&self) -> Option<MatchedOverlay> {
        self.modal.borrow().screen.as_ref().map(|s| s.overlay.clone())
    }

    fn start_dismiss(&self) {
        let (delegate, from) = {
            let mut modal = self.modal.borrow_mut();
            let Some(screen) = modal.screen.as_ref() else {
                return;
            };
            let parts = (screen.delegate.clone(), screen.content_layer.clone());
            modal.in_flight = true;
            parts
        };

        log::info!("dismissing modal");
        let weak = self.this.clone();
        let context = TransitionContext::new(from, self.root_layer.clone(), move |finished| {
            if let Some(host) = weak.upgrade() {
                host.dismiss_finished(finished);
            }
        });
        delegate.begin_dismiss(context);
    }

    fn present_finished(&self, finished: bool) {
        let pending = {
            let mut modal = self.modal.borrow_mut();
            modal.in_flight = false;
            std::mem::take(&mut modal.pending_dismiss)
        };
        log::info!("modal presented (finished: {})", finished);
        if pending {
            self.start_dismiss();
        }
    }

    fn dismiss_finished(&self, finished: bool) {
        let screen = {
            let mut modal = self.modal.borrow_mut();
            modal.in_flight = false;
            modal.screen.take()
        };
        drop(screen);
        log::info!("modal dismissed (finished: {})", finished);
    }
}

impl PresentationHost for HeadlessHost {
    fn present(&self, screen: PresentedScreen) {
        let (delegate, to) = {
            let mut modal = self.modal.borrow_mut();
            modal.present_calls += 1;
            if modal.screen.is_some() {
                log::warn!("present while a modal is already up; ignored");
                return;
            }
            let parts = (screen.delegate.clone(), screen.content_layer.clone());
            modal.screen = Some(screen);
            modal.in_flight = true;
            parts
        };

        log::info!("presenting modal");
        let weak = self.this.clone();
        let context = TransitionContext::new(self.root_layer.clone(), to, move |finished| {
            if let Some(host) = weak.upgrade() {
                host.present_finished(finished);
            }
        });
        delegate.begin_present(context);
    }

    fn dismiss(&self) {
        {
            let mut modal = self.modal.borrow_mut();
            modal.dismiss_calls += 1;
            if modal.screen.is_none() {
                log::debug!("dismiss with nothing presented");
                return;
            }
            if modal.in_flight {
                modal.pending_dismiss = true;
                return;
            }
        }
        self.start_dismiss();
    }
}
