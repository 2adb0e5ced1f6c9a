//! Game state and core simulation types
//!
//! Everything a run owns. Replaced wholesale on every start.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{
    Collectable, EntityList, Field, FloatingText, GridLine, Obstacle, Particle, Player,
};
use super::spawner::Spawner;
use crate::color::Color;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Nothing started yet
    Ready,
    /// Active gameplay
    Playing,
    /// Crashed; effects keep animating until the game over screen
    Dying,
    /// Run ended, loop stopped
    GameOver,
}

/// Identifies a run so late callbacks from an earlier run can be ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RunId(pub u32);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0.wrapping_add(1))
    }
}

/// Things the simulation wants the outside world (audio, HUD, storage) to
/// react to. Drained by the frame loop every tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Collectable picked up
    Collected { points: u64, pos: Vec2 },
    /// Music should speed up
    TempoUp,
    /// New level reached
    LevelUp { level: u32, hue: f32, multiplier: u32 },
    /// Rainbow mode entered
    Rainbow { cleared: u32 },
    /// Player hit an obstacle
    Died { score: u64 },
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub multiplier: u32,
    /// Scroll speed (pixels/s)
    pub speed: f32,
    pub obstacles_cleared: u32,
    /// Grid hue (degrees)
    pub grid_hue: f32,
    pub rainbow: bool,
    pub field: Field,
    pub spawner: Spawner,
    pub player: Player,
    pub obstacles: EntityList<Obstacle>,
    pub collectables: EntityList<Collectable>,
    pub particles: EntityList<Particle>,
    pub texts: EntityList<FloatingText>,
    pub grid_lines: EntityList<GridLine>,
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh run in the [`GamePhase::Ready`] phase
    pub fn new(seed: u64, field: Field) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Ready,
            score: 0,
            multiplier: 1,
            speed: START_SPEED,
            obstacles_cleared: 0,
            grid_hue: LEVEL_HUES[0],
            rainbow: false,
            field,
            spawner: Spawner::default(),
            player: Player::new(field),
            obstacles: EntityList::new(),
            collectables: EntityList::new(),
            particles: EntityList::new(),
            texts: EntityList::new(),
            grid_lines: EntityList::new(),
            events: Vec::new(),
        }
    }

    /// Create a fresh run that is already playing
    pub fn playing(seed: u64, field: Field) -> Self {
        let mut state = Self::new(seed, field);
        state.phase = GamePhase::Playing;
        state
    }

    /// Frame loop should keep running
    pub fn is_active(&self) -> bool {
        matches!(self.phase, GamePhase::Playing | GamePhase::Dying)
    }

    /// Player has crashed
    pub fn is_dead(&self) -> bool {
        matches!(self.phase, GamePhase::Dying | GamePhase::GameOver)
    }

    /// Current translucent grid color
    pub fn grid_color(&self) -> Color {
        Color::grid(self.grid_hue)
    }

    /// Spawn a particle burst
    pub fn burst(&mut self, pos: Vec2, color: Color) {
        for _ in 0..BURST_PARTICLES {
            let particle = Particle::spawn(&mut self.rng, pos, color);
            self.particles.push(particle);
        }
    }

    /// Add points (scaled by the caller)
    pub fn award(&mut self, points: u64) {
        self.score += points;
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
