//! Abstract 2D drawing surface
//!
//! The subset of a canvas 2D context the game paints with.

use crate::color::Color;
use crate::sim::Field;

/// Immediate-mode 2D painter
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Push paint state
    fn save(&mut self);
    /// Pop paint state
    fn restore(&mut self);

    fn set_fill(&mut self, color: Color);
    fn set_stroke(&mut self, color: Color);
    /// Global alpha (0-1)
    fn set_alpha(&mut self, alpha: f32);
    /// Glow: blur radius 0 disables it
    fn set_shadow(&mut self, blur: f32, color: Color);
    fn set_line_width(&mut self, width: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn close_path(&mut self);
    /// Full circle subpath
    fn circle(&mut self, x: f32, y: f32, radius: f32);
    fn fill(&mut self);
    fn stroke(&mut self);

    /// Text horizontally centered on `x`
    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &str);

    /// Current size as a play field
    fn field(&self) -> Field {
        Field::new(self.width(), self.height())
    }
}
