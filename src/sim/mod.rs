//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - Ordered entity storage (insertion order is draw order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{check_collisions, hits_obstacle, kill_player, reaches_collectable};
pub use entity::{
    Collectable, Entity, EntityList, Field, FloatingText, FrameCtx, GridLine, Obstacle, Particle,
    Player,
};
pub use spawner::Spawner;
pub use state::{GameEvent, GamePhase, GameState, RunId};
pub use tick::{Layer, frame_dt, tick, tick_with};
