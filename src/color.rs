//! Paint colors, rendered as CSS color strings

use std::fmt;

/// A paint color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f32),
    /// Hue in degrees, saturation/lightness in percent, alpha 0-1
    Hsla { h: f32, s: f32, l: f32, a: f32 },
}

impl Color {
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    /// Player (#0ff)
    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    /// Obstacles (#f0f)
    pub const MAGENTA: Color = Color::Rgb(255, 0, 255);
    /// Collectables (#ffd700)
    pub const GOLD: Color = Color::Rgb(255, 215, 0);
    /// Background fade, translucent so old frames leave streaks
    pub const BACKDROP: Color = Color::Rgba(5, 5, 16, 0.4);

    /// Translucent grid color for a hue
    pub fn grid(hue: f32) -> Self {
        Color::Hsla {
            h: hue,
            s: 100.0,
            l: 50.0,
            a: 0.2,
        }
    }

    /// CSS representation (what a canvas paint style expects)
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Color::Rgb(r, g, b) => write!(f, "rgb({r}, {g}, {b})"),
            Color::Rgba(r, g, b, a) => write!(f, "rgba({r}, {g}, {b}, {a})"),
            Color::Hsla { h, s, l, a } => write!(f, "hsla({h}, {s}%, {l}%, {a})"),
        }
    }
}
