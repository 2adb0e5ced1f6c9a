//! Recording surface for native runs and tests

use super::surface::Surface;
use crate::color::Color;

/// A recorded paint operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32 },
    Fill { color: Color, alpha: f32 },
    Stroke { color: Color, width: f32 },
    Text { text: String, x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy)]
struct Paint {
    fill: Color,
    stroke: Color,
    alpha: f32,
    line_width: f32,
    blur: f32,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill: Color::Rgb(0, 0, 0),
            stroke: Color::Rgb(0, 0, 0),
            alpha: 1.0,
            line_width: 1.0,
            blur: 0.0,
        }
    }
}

/// Surface that keeps a log of what was painted instead of pixels
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: f32,
    height: f32,
    paint: Paint,
    stack: Vec<Paint>,
    pub ops: Vec<DrawOp>,
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            paint: Paint::default(),
            stack: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Forget recorded operations (keeps paint state)
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Texts painted since the last clear
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Depth of the save/restore stack
    pub fn saved_depth(&self) -> usize {
        self.stack.len()
    }

    /// Current glow radius
    pub fn blur(&self) -> f32 {
        self.paint.blur
    }

    /// Current global alpha
    pub fn alpha(&self) -> f32 {
        self.paint.alpha
    }
}

impl Surface for HeadlessSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn save(&mut self) {
        self.stack.push(self.paint);
    }

    fn restore(&mut self) {
        if let Some(paint) = self.stack.pop() {
            self.paint = paint;
        }
    }

    fn set_fill(&mut self, color: Color) {
        self.paint.fill = color;
    }

    fn set_stroke(&mut self, color: Color) {
        self.paint.stroke = color;
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.paint.alpha = alpha;
    }

    fn set_shadow(&mut self, blur: f32, _color: Color) {
        self.paint.blur = blur;
    }

    fn set_line_width(&mut self, width: f32) {
        self.paint.line_width = width;
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            w,
            h,
            color: self.paint.fill,
            alpha: self.paint.alpha,
        });
    }

    fn begin_path(&mut self) {}

    fn move_to(&mut self, _x: f32, _y: f32) {}

    fn line_to(&mut self, _x: f32, _y: f32) {}

    fn close_path(&mut self) {}

    fn circle(&mut self, _x: f32, _y: f32, _radius: f32) {}

    fn fill(&mut self) {
        self.ops.push(DrawOp::Fill {
            color: self.paint.fill,
            alpha: self.paint.alpha,
        });
    }

    fn stroke(&mut self) {
        self.ops.push(DrawOp::Stroke {
            color: self.paint.stroke,
            width: self.paint.line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _font: &str) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}
