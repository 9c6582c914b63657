//! 2D canvas backend for the draw surface

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, DrawSurface};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    /// Wrap a canvas' 2D context. Returns `None` if the context is unavailable.
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

impl DrawSurface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if let Err(e) = self
            .ctx
            .ellipse(x as f64, y as f64, rx as f64, ry as f64, 0.0, 0.0, TAU)
        {
            log::warn!("ellipse failed: {:?}", e);
            return;
        }
        self.ctx.fill();
    }
}
