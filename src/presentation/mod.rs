//! Bridge between the declarative "is presented" flag and a host's
//! imperative modal presentation.
//!
//! The host implements [`PresentationHost`]; the engine hands it a
//! [`PresentedScreen`] whose [`TransitionDelegate`] the host calls at the
//! lifecycle points of the modal: when it begins presenting, when it begins
//! dismissing, and when the user is about to dismiss it through system chrome.

pub mod coordinator;
pub mod headless;

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::Frame;
use crate::paint::PaintContext;
use crate::transition::MatchedOverlay;
use crate::view::View;

pub use coordinator::PresentationCoordinator;
pub use headless::HeadlessHost;

/// Opacity handle for a screen's real content.
#[derive(Clone, Debug)]
pub struct ContentLayer {
    opacity: Rc<Cell<f32>>,
}

impl ContentLayer {
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: Rc::new(Cell::new(opacity)),
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.opacity.set(opacity.clamp(0.0, 1.0));
    }
}

impl Default for ContentLayer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Everything an animator may touch while a transition runs.
pub struct TransitionContext {
    /// Content of the screen being left
    pub from: ContentLayer,
    /// Content of the screen being revealed
    pub to: ContentLayer,
    completion: Option<Box<dyn FnOnce(bool)>>,
}

impl TransitionContext {
    pub fn new<F>(from: ContentLayer, to: ContentLayer, completion: F) -> Self
    where
        F: FnOnce(bool) + 'static,
    {
        Self {
            from,
            to,
            completion: Some(Box::new(completion)),
        }
    }

    /// Run `then` after the existing completion.
    pub fn chain<F>(mut self, then: F) -> Self
    where
        F: FnOnce(bool) + 'static,
    {
        let first = self.completion.take();
        self.completion = Some(Box::new(move |finished| {
            if let Some(first) = first {
                first(finished);
            }
            then(finished);
        }));
        self
    }

    /// Tell the host the transition is over.
    pub fn complete(mut self, finished: bool) {
        if let Some(completion) = self.completion.take() {
            completion(finished);
        }
    }
}

/// Engine-side hooks the host invokes.
pub trait TransitionDelegate {
    fn begin_present(&self, context: TransitionContext);
    fn begin_dismiss(&self, context: TransitionContext);
    /// The user started dismissing the modal through system gesture or chrome.
    fn will_dismiss_by_user(&self);
}

/// The host's modal-presentation subsystem.
pub trait PresentationHost {
    fn present(&self, screen: PresentedScreen);
    fn dismiss(&self);
}

/// A modal screen: caller content, the overlay on top, and the delegate
/// that animates it in and out.
pub struct PresentedScreen {
    pub content: Box<dyn View>,
    pub content_layer: ContentLayer,
    pub overlay: MatchedOverlay,
    pub delegate: Rc<dyn TransitionDelegate>,
}

impl PresentedScreen {
    pub fn layout(&mut self, bounds: Frame) {
        self.content.layout(bounds);
    }

    pub fn paint(&self, ctx: &mut PaintContext) {
        ctx.with_opacity(self.content_layer.opacity(), |ctx| self.content.paint(ctx));
        self.overlay.paint(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_chain_runs_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let first = order.clone();
        let second = order.clone();
        let context = TransitionContext::new(ContentLayer::default(), ContentLayer::default(), move |f| {
            first.borrow_mut().push(("host", f))
        })
        .chain(move |f| second.borrow_mut().push(("engine", f)));

        context.complete(true);
        assert_eq!(*order.borrow(), vec![("host", true), ("engine", true)]);
    }

    #[test]
    fn test_content_layer_clamps() {
        let layer = ContentLayer::default();
        layer.set_opacity(1.4);
        assert_eq!(layer.opacity(), 1.0);
        layer.clone().set_opacity(-0.2);
        assert_eq!(layer.opacity(), 0.0);
    }
}
