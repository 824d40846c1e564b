//! Captured visual content, decoupled from where it is drawn.
//!
//! A [`Snapshot`] answers "what to draw"; the frame it is drawn into comes
//! from the registry, the transition state or the overlay's animated layers.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::Result;
use crate::geometry::Frame;
use crate::paint::PaintContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// Content that knows how to paint itself into an arbitrary frame.
pub trait Paint {
    fn paint(&self, ctx: &mut PaintContext, frame: Frame, opacity: f32);
}

/// Type-erased visual content of a tagged element.
#[derive(Clone)]
pub enum Snapshot {
    Solid(Color),
    Image(Arc<RgbaImage>),
    Custom(Rc<dyn Paint>),
}

impl Snapshot {
    pub fn solid(color: Color) -> Self {
        Snapshot::Solid(color)
    }

    pub fn image(image: RgbaImage) -> Self {
        Snapshot::Image(Arc::new(image))
    }

    /// Decode an encoded image (PNG) into a snapshot.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::image(image))
    }

    pub fn custom(paint: impl Paint + 'static) -> Self {
        Snapshot::Custom(Rc::new(paint))
    }

    pub fn paint(&self, ctx: &mut PaintContext, frame: Frame, opacity: f32) {
        match self {
            Snapshot::Solid(color) => ctx.fill(frame, *color, opacity),
            Snapshot::Image(image) => ctx.image(frame, image.dimensions(), opacity),
            Snapshot::Custom(paint) => paint.paint(ctx, frame, opacity),
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Solid(color) => write!(f, "Solid({:?})", color),
            Snapshot::Image(image) => {
                let (w, h) = image.dimensions();
                write!(f, "Image({}x{})", w, h)
            }
            Snapshot::Custom(_) => write!(f, "Custom"),
        }
    }
}
