//! Neon Ascent - A neon endless runner
//!
//! Core modules:
//! - `sim`: Simulation (entities, spawning, collisions, scoring)
//! - `game`: Frame loop controller composing sim, rendering and audio
//! - `render`: Abstract 2D drawing surface and entity drawing
//! - `audio`: Lookahead music sequencer and sound effects
//! - `platform`: Input mapping and key-value storage

pub mod audio;
pub mod color;
pub mod error;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use color::Color;
pub use error::{Error, Result};
pub use game::{GameLoop, LoopControl, StartOutcome};
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_DT: f32 = 0.1;
    /// Delay between death and the game over screen (milliseconds)
    pub const DEATH_PAUSE_MS: i32 = 1500;

    /// Scroll speed bounds (pixels/s)
    pub const START_SPEED: f32 = 300.0;
    pub const MAX_SPEED: f32 = 1500.0;
    /// Speed gained per cleared obstacle
    pub const SPEED_STEP: f32 = 3.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_BOTTOM_OFFSET: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 420.0;
    pub const TRAIL_LENGTH: usize = 10;
    pub const TRAIL_INTERVAL: f32 = 0.03;

    /// Obstacle defaults
    pub const OBSTACLE_HEIGHT: f32 = 20.0;
    pub const OBSTACLE_MIN_WIDTH: f32 = 20.0;
    pub const OBSTACLE_MAX_WIDTH: f32 = 70.0;
    /// Vertical gap between consecutive obstacles (pixels)
    pub const OBSTACLE_GAP: f32 = 300.0;

    /// Collectable defaults
    pub const COLLECTABLE_RADIUS: f32 = 12.0;
    pub const COLLECTABLE_INTERVAL: f32 = 3.0;
    /// Wobble phase speed (radians/s)
    pub const COLLECTABLE_WOBBLE_RATE: f32 = 3.0;
    /// Lateral sway amplitude (pixels/s at peak)
    pub const COLLECTABLE_SWAY: f32 = 30.0;

    /// Vertical gap between background grid lines (pixels)
    pub const GRID_LINE_GAP: f32 = 100.0;
    pub const GRID_LINE_START_Y: f32 = -10.0;

    /// Particles per burst
    pub const BURST_PARTICLES: usize = 20;
    pub const PARTICLE_MAX_SPEED: f32 = 450.0;

    pub const TEXT_RISE_SPEED: f32 = 120.0;
    pub const TEXT_FADE_RATE: f32 = 1.2;

    /// Scoring
    pub const CLEAR_POINTS: u64 = 10;
    pub const COLLECT_POINTS: u64 = 100;
    /// Cleared obstacles per level
    pub const LEVEL_LENGTH: u32 = 25;
    /// Cleared obstacles per tempo increase
    pub const TEMPO_STEP_EVERY: u32 = 5;
    /// Cleared obstacles after which rainbow mode starts
    pub const RAINBOW_THRESHOLD: u32 = 100;
    /// Rainbow hue rotation (degrees/s)
    pub const RAINBOW_HUE_RATE: f32 = 120.0;
    /// Grid hue per level (cyan, magenta, yellow, green, red)
    pub const LEVEL_HUES: [f32; 5] = [180.0, 300.0, 60.0, 120.0, 0.0];
}

/// Axis-aligned rectangle overlap (strict: touching edges don't overlap)
#[inline]
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Wrap a hue in degrees to [0, 360)
#[inline]
pub fn wrap_hue(hue: f32) -> f32 {
    hue.rem_euclid(360.0)
}
