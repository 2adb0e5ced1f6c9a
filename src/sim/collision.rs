//! Collision detection and response
//!
//! Obstacles are boxes (strict AABB overlap); collectables are circles tested
//! against the player's center with a strict distance check.

use glam::Vec2;

use super::entity::{Collectable, Obstacle, Player};
use super::scoring;
use super::state::{GameEvent, GamePhase, GameState};
use crate::rects_overlap;

/// Player box overlaps obstacle box
pub fn hits_obstacle(player: &Player, obstacle: &Obstacle) -> bool {
    rects_overlap(player.pos, player.size, obstacle.pos, obstacle.size)
}

/// Collectable is within reach of the player's center (boundary excluded)
pub fn reaches_collectable(player: &Player, collectable: &Collectable) -> bool {
    let reach = collectable.radius + player.size.x / 2.0;
    collectable.pos.distance(player.center()) < reach
}

/// Run all per-frame collision checks. Death short-circuits the rest.
pub fn check_collisions(state: &mut GameState) {
    if state.is_dead() {
        return;
    }

    if state
        .obstacles
        .live()
        .any(|o| hits_obstacle(&state.player, o))
    {
        kill_player(state);
        return;
    }

    let mut picked: Vec<Vec2> = Vec::new();
    for c in state.collectables.live_mut() {
        if reaches_collectable(&state.player, c) {
            c.gone = true;
            picked.push(c.pos);
        }
    }
    state.collectables.compact();

    for pos in picked {
        scoring::collected(state, pos);
    }
}

/// Death sequence (simulation side): flag, hide, burst. Idempotent.
pub fn kill_player(state: &mut GameState) {
    if state.is_dead() {
        return;
    }

    state.phase = GamePhase::Dying;
    state.player.visible = false;
    let center = state.player.center();
    let color = state.player.color;
    state.burst(center, color);

    log::info!("Crashed with score {}", state.score);
    state.events.push(GameEvent::Died { score: state.score });
}
