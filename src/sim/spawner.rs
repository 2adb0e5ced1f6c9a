//! Accumulator-driven spawning
//!
//! Each timer adds `dt` per tick and fires when it strictly exceeds its
//! interval, then restarts at zero (overshoot is dropped).

use rand_pcg::Pcg32;

use super::entity::{Collectable, Field, GridLine, Obstacle};
use crate::consts::*;

/// Spawn timers (seconds)
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    pub obstacle_timer: f32,
    pub collectable_timer: f32,
    pub grid_line_timer: f32,
}

/// Advance a timer, returning true when it fires
fn accumulate(timer: &mut f32, dt: f32, interval: f32) -> bool {
    *timer += dt;
    if *timer > interval {
        *timer = 0.0;
        true
    } else {
        false
    }
}

/// Seconds between obstacles: a constant pixel gap at any speed
pub fn obstacle_interval(speed: f32) -> f32 {
    OBSTACLE_GAP / speed
}

/// Seconds between background grid lines
pub fn grid_line_interval(speed: f32) -> f32 {
    GRID_LINE_GAP / speed
}

impl Spawner {
    pub fn obstacle(
        &mut self,
        dt: f32,
        speed: f32,
        rng: &mut Pcg32,
        field: Field,
    ) -> Option<Obstacle> {
        accumulate(&mut self.obstacle_timer, dt, obstacle_interval(speed))
            .then(|| Obstacle::spawn(rng, field))
    }

    pub fn collectable(&mut self, dt: f32, rng: &mut Pcg32, field: Field) -> Option<Collectable> {
        accumulate(&mut self.collectable_timer, dt, COLLECTABLE_INTERVAL)
            .then(|| Collectable::spawn(rng, field))
    }

    pub fn grid_line(&mut self, dt: f32, speed: f32) -> Option<GridLine> {
        accumulate(&mut self.grid_line_timer, dt, grid_line_interval(speed))
            .then(GridLine::default)
    }
}
