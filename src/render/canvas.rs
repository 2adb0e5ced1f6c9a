//! Browser canvas backend

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::Surface;
use crate::color::Color;
use crate::error::{Error, Result};

/// `CanvasRenderingContext2d` behind the [`Surface`] trait
pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2d {
    /// Grab the 2D context of the canvas with the given element id
    pub fn from_element_id(id: &str) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::SurfaceUnavailable("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(id)
            .ok_or_else(|| Error::SurfaceUnavailable(format!("no element #{id}")))?
            .dyn_into()
            .map_err(|_| Error::SurfaceUnavailable(format!("#{id} is not a canvas")))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| Error::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| Error::SurfaceUnavailable("2d context unsupported".into()))?
            .dyn_into()
            .map_err(|_| Error::SurfaceUnavailable("unexpected context type".into()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to a container's client size
    pub fn fit_to(&self, width: i32, height: i32) {
        self.canvas.set_width(width.max(0) as u32);
        self.canvas.set_height(height.max(0) as u32);
    }
}

impl Surface for Canvas2d {
    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_fill(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn set_stroke(&mut self, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn set_shadow(&mut self, blur: f32, color: Color) {
        self.ctx.set_shadow_blur(blur as f64);
        self.ctx.set_shadow_color(&color.to_css());
    }

    fn set_line_width(&mut self, width: f32) {
        self.ctx.set_line_width(width as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn circle(&mut self, x: f32, y: f32, radius: f32) {
        let _ = self.ctx.arc(
            x as f64,
            y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}
