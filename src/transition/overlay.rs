//! Top-layer proxy that draws matched elements while they morph.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::animation::{Transition, Tween};
use crate::geometry::Frame;
use crate::paint::PaintContext;
use crate::reactive::{AnimationStatus, Observe, Scheduler, Subscription};
use crate::registry::MatchId;
use crate::transition::{StateChange, TransitionState};

struct OverlayInner {
    state: TransitionState,
    scheduler: Scheduler,
    transition: Transition,
    /// One animated frame per tracked id, chasing `current_frames`
    layers: BTreeMap<MatchId, Tween<Frame>>,
    hidden: bool,
    ticking: bool,
    _subscription: Option<Subscription>,
}

/// Renders each tracked id as its source snapshot under its destination
/// snapshot, both placed at a locally sprung copy of the current frame.
///
/// `current_frames` moves in discrete jumps; every jump restarts a spring
/// from wherever the layer is drawn now, so the visual never snaps.
#[derive(Clone)]
pub struct MatchedOverlay {
    inner: Rc<RefCell<OverlayInner>>,
}

impl MatchedOverlay {
    pub fn new(state: TransitionState, scheduler: Scheduler, transition: Transition) -> Self {
        let inner = Rc::new(RefCell::new(OverlayInner {
            state: state.clone(),
            scheduler,
            transition,
            layers: BTreeMap::new(),
            hidden: false,
            ticking: false,
            _subscription: None,
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = state.subscribe(move |state, change| {
            if !change.contains(StateChange::CURRENT_FRAMES) {
                return Observe::Keep;
            }
            match weak.upgrade() {
                Some(inner) => {
                    Self::sync_layers(&inner, state);
                    Observe::Keep
                }
                None => Observe::Remove,
            }
        });
        inner.borrow_mut()._subscription = Some(subscription);

        Self { inner }
    }

    fn sync_layers(inner: &Rc<RefCell<OverlayInner>>, state: &TransitionState) {
        let frames = state.current_frames();
        let start_ticking = {
            let mut overlay = inner.borrow_mut();
            let overlay = &mut *overlay;
            overlay.layers.retain(|id, _| frames.contains_key(id));
            for (id, frame) in frames {
                let layer = overlay
                    .layers
                    .entry(id)
                    .or_insert_with(|| Tween::new(frame, overlay.transition.clone()));
                if layer.is_initial() {
                    layer.set_immediate(frame);
                } else {
                    layer.animate_to(frame);
                }
            }
            let any_moving = overlay.layers.values().any(Tween::is_animating);
            let start = any_moving && !overlay.ticking;
            if start {
                overlay.ticking = true;
            }
            start
        };

        if start_ticking {
            let weak = Rc::downgrade(inner);
            let scheduler = inner.borrow().scheduler.clone();
            scheduler.add_animation(move |dt| Self::tick(&weak, dt));
        }
    }

    fn tick(weak: &Weak<RefCell<OverlayInner>>, dt: f32) -> AnimationStatus {
        let Some(inner) = weak.upgrade() else {
            return AnimationStatus::Finished;
        };
        let mut overlay = inner.borrow_mut();
        let mut moving = false;
        for layer in overlay.layers.values_mut() {
            layer.advance(dt);
            moving |= layer.is_animating();
        }
        if moving {
            AnimationStatus::Running
        } else {
            overlay.ticking = false;
            AnimationStatus::Finished
        }
    }

    pub fn show(&self) {
        self.inner.borrow_mut().hidden = false;
    }

    pub fn hide(&self) {
        self.inner.borrow_mut().hidden = true;
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.borrow().hidden
    }

    /// Where the overlay currently draws `id`.
    pub fn rendered_frame(&self, id: &MatchId) -> Option<Frame> {
        self.inner.borrow().layers.get(id).map(|layer| *layer.current())
    }

    pub fn is_settled(&self) -> bool {
        !self.inner.borrow().layers.values().any(Tween::is_animating)
    }

    pub fn paint(&self, ctx: &mut PaintContext) {
        let overlay = self.inner.borrow();
        if overlay.hidden {
            return;
        }
        let state = &overlay.state;
        let source_opacity = if state.is_animating() { 0.0 } else { 1.0 };
        for (id, layer) in &overlay.layers {
            let frame = *layer.current();
            if let Some(source) = state.source(id) {
                source.snapshot.paint(ctx, frame, source_opacity);
            }
            if let Some(destination) = state.destination(id) {
                destination.snapshot.paint(ctx, frame, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SpringConfig;
    use crate::paint::DrawCommand;
    use crate::registry::{FrameSet, MatchedRecord};
    use crate::snapshot::{Color, Snapshot};

    const SMALL: Frame = Frame {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    };
    const LARGE: Frame = Frame {
        x: 0.0,
        y: 0.0,
        width: 400.0,
        height: 400.0,
    };

    fn setup() -> (TransitionState, Scheduler, MatchedOverlay) {
        let state = TransitionState::new();
        let mut sources = BTreeMap::new();
        sources.insert(
            MatchId::from("image"),
            MatchedRecord {
                snapshot: Snapshot::solid(Color::WHITE),
                frame: SMALL,
            },
        );
        state.begin_cycle(sources).unwrap();
        state.set_destination("image".into(), Snapshot::solid(Color::BLACK), LARGE);
        let scheduler = Scheduler::new();
        let overlay = MatchedOverlay::new(
            state.clone(),
            scheduler.clone(),
            Transition::spring(SpringConfig::HERO, 1.0),
        );
        (state, scheduler, overlay)
    }

    fn frames(frame: Frame) -> FrameSet {
        let mut set = FrameSet::new();
        set.insert("image".into(), frame);
        set
    }

    #[test]
    fn test_first_frame_set_snaps() {
        let (state, scheduler, overlay) = setup();
        state.set_current_frames(frames(SMALL)).unwrap();
        assert_eq!(overlay.rendered_frame(&"image".into()), Some(SMALL));
        assert!(overlay.is_settled());
        assert_eq!(scheduler.active_animations(), 0);
    }

    #[test]
    fn test_jump_is_followed_by_spring() {
        let (state, scheduler, overlay) = setup();
        state.set_current_frames(frames(SMALL)).unwrap();
        state.set_current_frames(frames(LARGE)).unwrap();

        // Registration frame, then six 60 Hz frames
        for _ in 0..7 {
            scheduler.frame(1.0 / 60.0);
        }
        let mid = overlay.rendered_frame(&"image".into()).unwrap();
        assert!(mid.width > 100.0 && mid.width < 400.0, "mid was {:?}", mid);

        for _ in 0..70 {
            scheduler.frame(1.0 / 60.0);
        }
        assert_eq!(overlay.rendered_frame(&"image".into()), Some(LARGE));
        assert_eq!(scheduler.active_animations(), 0);
    }

    #[test]
    fn test_source_hidden_while_animating() {
        let (state, _scheduler, overlay) = setup();
        state.set_current_frames(frames(SMALL)).unwrap();

        let mut ctx = PaintContext::new();
        overlay.paint(&mut ctx);
        assert_eq!(ctx.commands().len(), 2);

        state.set_animating(true);
        let mut ctx = PaintContext::new();
        overlay.paint(&mut ctx);
        assert!(matches!(
            ctx.commands(),
            [DrawCommand::Fill { color, .. }] if *color == Color::BLACK
        ));
    }

    #[test]
    fn test_hidden_overlay_paints_nothing() {
        let (state, _scheduler, overlay) = setup();
        state.set_current_frames(frames(SMALL)).unwrap();
        overlay.hide();
        let mut ctx = PaintContext::new();
        overlay.paint(&mut ctx);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_dropping_overlay_unsubscribes() {
        let (state, _scheduler, overlay) = setup();
        assert_eq!(state.observer_count(), 1);
        drop(overlay);
        assert_eq!(state.observer_count(), 0);
    }
}
