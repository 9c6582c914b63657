//! Rendering module
//!
//! The game draws through the [`DrawSurface`] trait: a minimal set of filled
//! shape commands with a top-left origin and y growing downward. The browser
//! backs it with a 2D canvas; tests record the commands.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{draw_devil, draw_frame, draw_player};

/// RGBA colour (alpha 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS colour string (`#rrggbb` when opaque)
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Opaque drawing target
pub trait DrawSurface {
    /// Wipe the whole surface
    fn clear(&mut self);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    /// Filled axis-aligned ellipse centred at (x, y)
    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, color: Color);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Ellipse {
        x: f32,
        y: f32,
        rx: f32,
        ry: f32,
        color: Color,
    },
}

/// Surface that keeps every command it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands issued since the last clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn ellipses(&self) -> impl Iterator<Item = &DrawCommand> {
        self.last_frame()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Ellipse { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, color: Color) {
        self.commands
            .push(DrawCommand::Ellipse { x, y, rx, ry, color });
    }
}
