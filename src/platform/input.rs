//! Key-state input
//!
//! Browser key events are folded into a [`TickInput`] snapshot that the frame
//! loop reads once per tick.

/// Movement intents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
}

impl Key {
    /// Map a `KeyboardEvent.code` (arrows or WASD)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            _ => None,
        }
    }
}

/// Input state for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left held
    pub left: bool,
    /// Right held
    pub right: bool,
    /// Pointer/touch x in canvas pixels (one-shot, cleared after the frame)
    pub pointer_x: Option<f32>,
}

impl TickInput {
    /// Apply a key press or release
    pub fn set_key(&mut self, key: Key, down: bool) {
        match key {
            Key::Left => self.left = down,
            Key::Right => self.right = down,
        }
    }

    /// Clear one-shot inputs after processing
    pub fn end_frame(&mut self) {
        self.pointer_x = None;
    }
}
