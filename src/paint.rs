//! Display-list output of a paint pass.
//!
//! Painting never touches a GPU here; views and the overlay append
//! [`DrawCommand`]s that a host backend (or a test) can consume.

use std::sync::Arc;

use crate::geometry::Frame;
use crate::snapshot::Color;

/// A single draw operation in global coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Solid fill covering `frame`.
    Fill {
        frame: Frame,
        color: Color,
        opacity: f32,
    },
    /// Raster image scaled into `frame`.
    Image {
        frame: Frame,
        /// Pixel dimensions of the source image.
        pixels: (u32, u32),
        opacity: f32,
    },
    /// Content painted by a custom [`Paint`](crate::snapshot::Paint) implementation.
    Custom {
        frame: Frame,
        label: Arc<str>,
        opacity: f32,
    },
}

impl DrawCommand {
    pub fn frame(&self) -> Frame {
        match self {
            DrawCommand::Fill { frame, .. }
            | DrawCommand::Image { frame, .. }
            | DrawCommand::Custom { frame, .. } => *frame,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            DrawCommand::Fill { opacity, .. }
            | DrawCommand::Image { opacity, .. }
            | DrawCommand::Custom { opacity, .. } => *opacity,
        }
    }
}

/// Collects draw commands, tracking a stack of group opacities.
#[derive(Debug, Default)]
pub struct PaintContext {
    commands: Vec<DrawCommand>,
    opacity_stack: Vec<f32>,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective opacity of the current group.
    pub fn opacity(&self) -> f32 {
        self.opacity_stack.iter().product()
    }

    /// Paint `f` with its output multiplied by `opacity`.
    pub fn with_opacity<R>(&mut self, opacity: f32, f: impl FnOnce(&mut Self) -> R) -> R {
        self.opacity_stack.push(opacity.clamp(0.0, 1.0));
        let result = f(self);
        self.opacity_stack.pop();
        result
    }

    pub fn fill(&mut self, frame: Frame, color: Color, opacity: f32) {
        let opacity = opacity * self.opacity();
        self.push(DrawCommand::Fill {
            frame,
            color,
            opacity,
        });
    }

    pub fn image(&mut self, frame: Frame, pixels: (u32, u32), opacity: f32) {
        let opacity = opacity * self.opacity();
        self.push(DrawCommand::Image {
            frame,
            pixels,
            opacity,
        });
    }

    pub fn custom(&mut self, frame: Frame, label: Arc<str>, opacity: f32) {
        let opacity = opacity * self.opacity();
        self.push(DrawCommand::Custom {
            frame,
            label,
            opacity,
        });
    }

    // Fully transparent commands are dropped so the list only holds what is visible.
    fn push(&mut self, command: DrawCommand) {
        if command.opacity() > 0.0 {
            self.commands.push(command);
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}
