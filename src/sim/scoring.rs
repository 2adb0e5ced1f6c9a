//! Score bookkeeping and level progression
//!
//! Progression is keyed on the cleared-obstacle counter:
//! - every clear speeds the world up (until the cap)
//! - every 5th clear bumps the music tempo
//! - every 25th clear is a level: new grid hue and +1 multiplier, or rainbow
//!   mode from 100 clears onward

use super::entity::FloatingText;
use super::state::{GameEvent, GameState};
use crate::color::Color;
use crate::consts::*;

/// Hue for a level index, if the level has a fixed color
pub fn level_hue(level: u32) -> Option<f32> {
    LEVEL_HUES.get(level as usize).copied()
}

/// Score an obstacle that left the field and advance progression.
/// Does nothing once the player is dead.
pub fn obstacle_cleared(state: &mut GameState) {
    if state.is_dead() {
        return;
    }

    let points = CLEAR_POINTS * state.multiplier as u64;
    state.award(points);
    advance_level(state);
}

/// Award a picked-up collectable; returns the points given
pub fn collected(state: &mut GameState, pos: glam::Vec2) -> u64 {
    let points = COLLECT_POINTS * state.multiplier as u64;
    state.award(points);
    state.burst(pos, Color::GOLD);
    state
        .texts
        .push(FloatingText::new(format!("+{points}"), pos, Color::GOLD));
    state.events.push(GameEvent::Collected { points, pos });
    points
}

/// Progression step for one more cleared obstacle
fn advance_level(state: &mut GameState) {
    state.obstacles_cleared += 1;
    let cleared = state.obstacles_cleared;

    if state.speed < MAX_SPEED {
        state.speed = (state.speed + SPEED_STEP).min(MAX_SPEED);
        if cleared % TEMPO_STEP_EVERY == 0 {
            state.events.push(GameEvent::TempoUp);
        }
    }

    if cleared % LEVEL_LENGTH != 0 {
        return;
    }

    let level = cleared / LEVEL_LENGTH;
    if cleared >= RAINBOW_THRESHOLD {
        if !state.rainbow {
            state.events.push(GameEvent::Rainbow { cleared });
        }
        state.rainbow = true;
    } else if let Some(hue) = level_hue(level) {
        state.grid_hue = hue;
        state.multiplier += 1;

        let center = state.field.center();
        let color = state.grid_color();
        state.burst(center, color);
        state
            .texts
            .push(FloatingText::new("LEVEL UP!", center, Color::WHITE));

        state.events.push(GameEvent::LevelUp {
            level: level + 1,
            hue,
            multiplier: state.multiplier,
        });
    }
}

/// Rotate the grid hue while rainbow mode is on
pub fn advance_hue(state: &mut GameState, dt: f32) {
    if state.rainbow {
        state.grid_hue = crate::wrap_hue(state.grid_hue + RAINBOW_HUE_RATE * dt);
    }
}
