//! Entity model
//!
//! Plain data plus per-frame update rules. Drawing lives in `render::draw`.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::color::Color;
use crate::consts::*;
use crate::platform::TickInput;

/// Play field size in pixels (mirrors the drawing surface)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Per-frame values every entity update needs
#[derive(Debug, Clone, Copy)]
pub struct FrameCtx {
    pub dt: f32,
    /// Current scroll speed (pixels/s)
    pub speed: f32,
    pub field: Field,
}

/// Transient entity living in an [`EntityList`]
pub trait Entity {
    fn update(&mut self, frame: &FrameCtx);

    /// True once the entity should be dropped at the next compaction
    fn expired(&self) -> bool;
}

/// Ordered entity storage. Insertion order is draw order; expired entries
/// stay in place until [`EntityList::compact`] runs.
#[derive(Debug, Clone)]
pub struct EntityList<T> {
    items: Vec<T>,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Update every live entry
    pub fn update_all(&mut self, frame: &FrameCtx) {
        for item in self.items.iter_mut().filter(|i| !i.expired()) {
            item.update(frame);
        }
    }

    /// Live entries in draw order
    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|i| !i.expired())
    }

    pub fn live_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter(|i| !i.expired())
    }

    /// Entry at `index`, expired or not
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Drop expired entries, keeping order
    pub fn compact(&mut self) {
        self.items.retain(|i| !i.expired());
    }

    /// Number of entries including not-yet-compacted expired ones
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
    trail_timer: f32,
    pub visible: bool,
}

impl Player {
    /// Spawn centered horizontally near the bottom of the field
    pub fn new(field: Field) -> Self {
        let size = Vec2::splat(PLAYER_SIZE);
        Self {
            pos: Vec2::new(
                field.width / 2.0 - size.x / 2.0,
                field.height - PLAYER_BOTTOM_OFFSET,
            ),
            size,
            vel: Vec2::ZERO,
            color: Color::CYAN,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
            trail_timer: 0.0,
            visible: true,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Steer from key state / pointer and record the trail
    pub fn update(&mut self, input: &TickInput, dt: f32, field: Field) {
        if !self.visible {
            return;
        }

        // Pointer wins over keys: it places the ship directly
        if let Some(x) = input.pointer_x {
            self.pos.x = x - self.size.x / 2.0;
        }

        self.vel.x = if input.left {
            -PLAYER_SPEED
        } else if input.right {
            PLAYER_SPEED
        } else {
            0.0
        };
        self.pos.x += self.vel.x * dt;
        self.pos.x = self.pos.x.min(field.width - self.size.x).max(0.0);

        self.trail_timer += dt;
        if self.trail_timer > TRAIL_INTERVAL {
            self.trail.push_back(self.pos);
            self.trail_timer = 0.0;
            if self.trail.len() > TRAIL_LENGTH {
                self.trail.pop_front();
            }
        }
    }
}

/// What an obstacle update observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleFate {
    Falling,
    /// Left the bottom of the field this frame
    Cleared,
}

/// A descending bar to dodge
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub gone: bool,
}

impl Obstacle {
    /// Random width, random x, just above the top edge
    pub fn spawn(rng: &mut Pcg32, field: Field) -> Self {
        let width = rng.random_range(OBSTACLE_MIN_WIDTH..OBSTACLE_MAX_WIDTH);
        let x = rng.random::<f32>() * (field.width - width).max(0.0);
        Self {
            pos: Vec2::new(x, -OBSTACLE_HEIGHT),
            size: Vec2::new(width, OBSTACLE_HEIGHT),
            gone: false,
        }
    }

    /// Move down; reports [`ObstacleFate::Cleared`] once, on the frame it
    /// leaves the field
    pub fn advance(&mut self, frame: &FrameCtx) -> ObstacleFate {
        if self.gone {
            return ObstacleFate::Falling;
        }
        self.pos.y += frame.speed * frame.dt;
        if self.pos.y > frame.field.height {
            self.gone = true;
            return ObstacleFate::Cleared;
        }
        ObstacleFate::Falling
    }
}

impl Entity for Obstacle {
    fn update(&mut self, frame: &FrameCtx) {
        self.advance(frame);
    }

    fn expired(&self) -> bool {
        self.gone
    }
}

/// A gold coin worth bonus points
#[derive(Debug, Clone)]
pub struct Collectable {
    pub pos: Vec2,
    pub radius: f32,
    /// Sway phase (radians)
    pub wobble: f32,
    pub gone: bool,
}

impl Collectable {
    pub fn spawn(rng: &mut Pcg32, field: Field) -> Self {
        let radius = COLLECTABLE_RADIUS;
        let x = rng.random::<f32>() * (field.width - radius * 2.0).max(0.0) + radius;
        Self {
            pos: Vec2::new(x, -radius),
            radius,
            wobble: rng.random::<f32>() * std::f32::consts::TAU,
            gone: false,
        }
    }
}

impl Entity for Collectable {
    fn update(&mut self, frame: &FrameCtx) {
        self.pos.y += frame.speed * frame.dt;
        self.pos.x += self.wobble.sin() * COLLECTABLE_SWAY * frame.dt;
        self.wobble += COLLECTABLE_WOBBLE_RATE * frame.dt;

        if self.pos.y > frame.field.height + self.radius {
            self.gone = true;
        }
    }

    fn expired(&self) -> bool {
        self.gone
    }
}

/// A fading spark from a burst
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
    pub alpha: f32,
    /// Alpha lost per second
    pub decay: f32,
}

impl Particle {
    pub fn spawn(rng: &mut Pcg32, pos: Vec2, color: Color) -> Self {
        let max = PARTICLE_MAX_SPEED;
        Self {
            pos,
            vel: Vec2::new(rng.random_range(-max..max), rng.random_range(-max..max)),
            radius: rng.random_range(1.0..4.0),
            color,
            alpha: 1.0,
            decay: rng.random_range(0.6..1.8),
        }
    }
}

impl Entity for Particle {
    fn update(&mut self, frame: &FrameCtx) {
        self.pos += self.vel * frame.dt;
        self.alpha -= self.decay * frame.dt;
    }

    fn expired(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Rising, fading label ("+100", "LEVEL UP!")
#[derive(Debug, Clone)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub color: Color,
    pub alpha: f32,
}

impl FloatingText {
    pub fn new(text: impl Into<String>, pos: Vec2, color: Color) -> Self {
        Self {
            text: text.into(),
            pos,
            color,
            alpha: 1.0,
        }
    }
}

impl Entity for FloatingText {
    fn update(&mut self, frame: &FrameCtx) {
        self.pos.y -= TEXT_RISE_SPEED * frame.dt;
        self.alpha -= TEXT_FADE_RATE * frame.dt;
    }

    fn expired(&self) -> bool {
        self.alpha <= 0.0
    }
}

/// Horizontal background line scrolling with the world
#[derive(Debug, Clone)]
pub struct GridLine {
    pub y: f32,
    gone: bool,
}

impl Default for GridLine {
    fn default() -> Self {
        Self {
            y: GRID_LINE_START_Y,
            gone: false,
        }
    }
}

impl Entity for GridLine {
    fn update(&mut self, frame: &FrameCtx) {
        self.y += frame.speed * frame.dt;
        if self.y > frame.field.height {
            self.gone = true;
        }
    }

    fn expired(&self) -> bool {
        self.gone
    }
}
