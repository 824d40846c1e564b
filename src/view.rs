//! Minimal view tree: tagging wrappers plus just enough containers to place them.

use crate::geometry::Frame;
use crate::paint::PaintContext;
use crate::registry::{GeometryRegistry, MatchId};
use crate::snapshot::Snapshot;
use crate::transition::TransitionState;

pub trait View {
    /// Lay out into `bounds`, given in global coordinates.
    fn layout(&mut self, bounds: Frame);
    fn paint(&self, ctx: &mut PaintContext);
}

/// Marks its content as the source of a matched transition under `id`.
///
/// Every layout publishes the snapshot and frame into the registry. While a
/// transition using the registry is animating, the element is not drawn;
/// the overlay draws its proxy instead.
pub struct SourceElement {
    id: MatchId,
    snapshot: Snapshot,
    registry: GeometryRegistry,
    frame: Option<Frame>,
}

impl SourceElement {
    pub fn new(id: impl Into<MatchId>, snapshot: Snapshot, registry: &GeometryRegistry) -> Self {
        Self {
            id: id.into(),
            snapshot,
            registry: registry.clone(),
            frame: None,
        }
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn is_visible(&self) -> bool {
        self.registry
            .active()
            .map_or(true, |state| !state.is_animating())
    }
}

impl View for SourceElement {
    fn layout(&mut self, bounds: Frame) {
        self.frame = Some(bounds);
        self.registry
            .register(self.id.clone(), self.snapshot.clone(), bounds);
    }

    fn paint(&self, ctx: &mut PaintContext) {
        if let (Some(frame), true) = (self.frame, self.is_visible()) {
            self.snapshot.paint(ctx, frame, 1.0);
        }
    }
}

/// Marks its content as the destination of a matched transition under `id`.
pub struct DestinationElement {
    id: MatchId,
    snapshot: Snapshot,
    state: TransitionState,
    frame: Option<Frame>,
}

impl DestinationElement {
    pub fn new(id: impl Into<MatchId>, snapshot: Snapshot, state: &TransitionState) -> Self {
        Self {
            id: id.into(),
            snapshot,
            state: state.clone(),
            frame: None,
        }
    }

    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn is_visible(&self) -> bool {
        !self.state.is_animating()
    }
}

impl View for DestinationElement {
    fn layout(&mut self, bounds: Frame) {
        self.frame = Some(bounds);
        self.state
            .set_destination(self.id.clone(), self.snapshot.clone(), bounds);
    }

    fn paint(&self, ctx: &mut PaintContext) {
        if let (Some(frame), true) = (self.frame, self.is_visible()) {
            self.snapshot.paint(ctx, frame, 1.0);
        }
    }
}

/// Paints a snapshot over whatever bounds it is given.
pub struct Fill {
    snapshot: Snapshot,
    frame: Frame,
}

impl Fill {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            frame: Frame::default(),
        }
    }
}

impl View for Fill {
    fn layout(&mut self, bounds: Frame) {
        self.frame = bounds;
    }

    fn paint(&self, ctx: &mut PaintContext) {
        self.snapshot.paint(ctx, self.frame, 1.0);
    }
}

/// Places children at fixed frames relative to its own origin. Later
/// children paint on top.
#[derive(Default)]
pub struct Stack {
    children: Vec<(Frame, Box<dyn View>)>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, frame: Frame, view: impl View + 'static) -> Self {
        self.children.push((frame, Box::new(view)));
        self
    }
}

impl View for Stack {
    fn layout(&mut self, bounds: Frame) {
        for (frame, child) in &mut self.children {
            child.layout(frame.offset(bounds.x, bounds.y));
        }
    }

    fn paint(&self, ctx: &mut PaintContext) {
        for (_, child) in &self.children {
            child.paint(ctx);
        }
    }
}
