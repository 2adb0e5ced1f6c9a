//! Per-frame simulation tick
//!
//! Phases run in a fixed order. The frame loop passes a layer callback that
//! draws each layer right after it updates, before expired entities are
//! compacted away; `tick` runs the same phases with nothing drawn.

use super::collision::check_collisions;
use super::entity::{FrameCtx, ObstacleFate};
use super::scoring;
use super::state::{GamePhase, GameState};
use crate::consts::MAX_DT;
use crate::platform::TickInput;

/// Draw layers, in paint order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Translucent fade over the previous frame
    Backdrop,
    /// Perspective grid and scrolling grid lines
    Grid,
    Collectables,
    Player,
    Obstacles,
    Particles,
    Texts,
}

/// Clamp the time between two frame timestamps (ms) to [0, MAX_DT] seconds.
/// The first frame of a run has no predecessor and gets 0.
pub fn frame_dt(last_timestamp: Option<f64>, timestamp: f64) -> f32 {
    let Some(last) = last_timestamp else {
        return 0.0;
    };
    let dt = ((timestamp - last) / 1000.0) as f32;
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, MAX_DT)
}

/// Advance the game state by one frame without drawing
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    tick_with(state, input, dt, |_, _| {});
}

/// Advance the game state by one frame, calling `draw` after each layer's
/// update
pub fn tick_with<F>(state: &mut GameState, input: &TickInput, dt: f32, mut draw: F)
where
    F: FnMut(Layer, &GameState),
{
    if state.phase == GamePhase::Ready {
        return;
    }
    // A stalled or garbage timestamp must not poison positions
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
    let alive = !state.is_dead();
    let frame = FrameCtx {
        dt,
        speed: state.speed,
        field: state.field,
    };

    draw(Layer::Backdrop, &*state);

    scoring::advance_hue(state, dt);

    // Background grid
    if alive {
        state.grid_lines.update_all(&frame);
    }
    draw(Layer::Grid, &*state);
    state.grid_lines.compact();
    if alive {
        if let Some(line) = state.spawner.grid_line(dt, state.speed) {
            state.grid_lines.push(line);
        }
    }

    // Collectables
    if alive {
        state.collectables.update_all(&frame);
    }
    draw(Layer::Collectables, &*state);
    state.collectables.compact();

    // Player (inert once hidden)
    state.player.update(input, dt, state.field);
    draw(Layer::Player, &*state);

    // Obstacles
    // Each clear speeds up the obstacles after it in the same frame
    if alive {
        for i in 0..state.obstacles.len() {
            let frame = FrameCtx {
                speed: state.speed,
                ..frame
            };
            let Some(obstacle) = state.obstacles.get_mut(i) else {
                break;
            };
            if obstacle.advance(&frame) == ObstacleFate::Cleared {
                scoring::obstacle_cleared(state);
            }
        }
    }
    draw(Layer::Obstacles, &*state);
    state.obstacles.compact();

    // Effects keep animating through the death pause
    state.particles.update_all(&frame);
    draw(Layer::Particles, &*state);
    state.particles.compact();

    state.texts.update_all(&frame);
    draw(Layer::Texts, &*state);
    state.texts.compact();

    if state.phase == GamePhase::Playing {
        let field = state.field;
        if let Some(o) = state.spawner.obstacle(dt, state.speed, &mut state.rng, field) {
            state.obstacles.push(o);
        }
        if let Some(c) = state.spawner.collectable(dt, &mut state.rng, field) {
            state.collectables.push(c);
        }
        check_collisions(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::{Collectable, Field, Obstacle};
    use crate::sim::state::GameEvent;
    use glam::Vec2;
    use proptest::prelude::*;

    const FIELD: Field = Field {
        width: 400.0,
        height: 600.0,
    };

    fn fresh(seed: u64) -> GameState {
        GameState::playing(seed, FIELD)
    }

    /// Obstacle about to leave the field, far from the player
    fn leaving_obstacle() -> Obstacle {
        Obstacle {
            pos: Vec2::new(0.0, FIELD.height - 0.5),
            size: Vec2::new(20.0, OBSTACLE_HEIGHT),
            gone: false,
        }
    }

    #[test]
    fn test_frame_dt_clamped() {
        assert_eq!(frame_dt(None, 5000.0), 0.0);
        assert!((frame_dt(Some(1000.0), 1016.0) - 0.016).abs() < 1e-6);
        assert_eq!(frame_dt(Some(1000.0), 9000.0), MAX_DT);
        assert_eq!(frame_dt(Some(1000.0), 900.0), 0.0);
    }

    #[test]
    fn test_ready_state_does_not_tick() {
        let mut state = GameState::new(1, FIELD);
        tick(&mut state, &TickInput::default(), 0.1);
        assert!(state.grid_lines.is_empty());
        assert_eq!(state.spawner.obstacle_timer, 0.0);
    }

    #[test]
    fn test_layers_draw_in_order() {
        let mut state = fresh(1);
        let mut layers = Vec::new();
        tick_with(&mut state, &TickInput::default(), 0.016, |layer, _| {
            layers.push(layer)
        });
        assert_eq!(
            layers,
            vec![
                Layer::Backdrop,
                Layer::Grid,
                Layer::Collectables,
                Layer::Player,
                Layer::Obstacles,
                Layer::Particles,
                Layer::Texts,
            ]
        );
    }

    #[test]
    fn test_cleared_obstacle_scores_once() {
        let mut state = fresh(1);
        state.multiplier = 2;
        state.obstacles.push(leaving_obstacle());

        tick(&mut state, &TickInput::default(), 0.016);
        assert_eq!(state.score, 20);
        assert_eq!(state.obstacles_cleared, 1);
        assert!(state.obstacles.live().all(|o| o.pos.y < FIELD.height));

        tick(&mut state, &TickInput::default(), 0.016);
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_clear_speeds_up_later_obstacles_same_frame() {
        let mut state = fresh(1);
        state.obstacles.push(leaving_obstacle());
        state.obstacles.push(Obstacle {
            pos: Vec2::new(0.0, 0.0),
            size: Vec2::new(20.0, OBSTACLE_HEIGHT),
            gone: false,
        });

        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.speed, START_SPEED + SPEED_STEP);
        let ys: Vec<f32> = state.obstacles.live().map(|o| o.pos.y).collect();
        assert_eq!(ys.len(), 1);
        assert!((ys[0] - (START_SPEED + SPEED_STEP) * 0.1).abs() < 1e-3, "y = {}", ys[0]);
    }

    #[test]
    fn test_non_finite_dt_is_a_still_frame() {
        for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut state = fresh(1);
            state.obstacles.push(Obstacle {
                pos: Vec2::new(0.0, 100.0),
                size: Vec2::new(20.0, OBSTACLE_HEIGHT),
                gone: false,
            });
            let player = state.player.pos;
            let hue = state.grid_hue;

            tick(&mut state, &TickInput::default(), dt);
            assert_eq!(state.player.pos, player);
            assert_eq!(state.grid_hue, hue);
            let ys: Vec<f32> = state.obstacles.live().map(|o| o.pos.y).collect();
            assert_eq!(ys, vec![100.0], "dt = {dt}");
            assert_eq!(state.phase, GamePhase::Playing);
        }
    }

    #[test]
    fn test_twenty_five_clears_level_up() {
        let mut state = fresh(1);
        for _ in 0..25 {
            state.obstacles.push(leaving_obstacle());
            tick(&mut state, &TickInput::default(), 0.016);
        }
        assert_eq!(state.score, 250);
        assert_eq!(state.multiplier, 2);
        assert_eq!(state.grid_hue, 300.0);
    }

    #[test]
    fn test_dead_world_freezes_but_effects_animate() {
        let mut state = fresh(1);
        state.obstacles.push(Obstacle {
            pos: state.player.pos,
            size: Vec2::new(40.0, OBSTACLE_HEIGHT),
            gone: false,
        });
        state.obstacles.push(leaving_obstacle());
        state.collectables.push(Collectable {
            pos: Vec2::new(50.0, 50.0),
            radius: COLLECTABLE_RADIUS,
            wobble: 0.0,
            gone: false,
        });

        // Spawn at dt 0 so positions don't move before the collision check
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.phase, GamePhase::Dying);
        let death_events = state.drain_events();
        assert!(death_events.iter().any(|e| matches!(e, GameEvent::Died { .. })));

        let coin_y = state.collectables.live().next().map(|c| c.pos.y);
        let alpha_before: f32 = state.particles.live().map(|p| p.alpha).sum();
        let score = state.score;
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), 0.05);
        }
        assert_eq!(state.collectables.live().next().map(|c| c.pos.y), coin_y);
        assert_eq!(state.score, score, "no clear points after death");
        let alpha_after: f32 = state.particles.live().map(|p| p.alpha).sum();
        assert!(alpha_after < alpha_before);
        assert_eq!(state.spawner.obstacle_timer, 0.0);
    }

    #[test]
    fn test_spawning_over_time() {
        let mut state = fresh(9);
        // 3.2 simulated seconds, player parked at the right edge
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut state, &input, 0.016);
            if state.is_dead() {
                break;
            }
        }
        assert!(!state.grid_lines.is_empty());
        assert!(state.obstacles.len() + state.obstacles_cleared as usize >= 2);
    }

    proptest! {
        #[test]
        fn prop_frame_dt_in_range(last in 0.0f64..1.0e7, delta in -1.0e5f64..1.0e6) {
            let dt = frame_dt(Some(last), last + delta);
            prop_assert!((0.0..=MAX_DT).contains(&dt));
        }

        #[test]
        fn prop_run_invariants(
            seed in any::<u64>(),
            steps in proptest::collection::vec((0u8..4, 0.0f32..0.2), 1..400),
        ) {
            let mut state = fresh(seed);
            let mut prev_score = state.score;
            let mut prev_mult = state.multiplier;
            let mut prev_speed = state.speed;
            let mut was_rainbow = false;
            let mut deaths = 0;

            for (keys, dt) in steps {
                let input = TickInput {
                    left: keys & 1 != 0,
                    right: keys & 2 != 0,
                    pointer_x: None,
                };
                tick(&mut state, &input, dt);
                deaths += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::Died { .. }))
                    .count();

                prop_assert!(state.score >= prev_score);
                prop_assert!(state.multiplier >= prev_mult);
                prop_assert!(state.speed >= prev_speed && state.speed <= MAX_SPEED);
                prop_assert!(!was_rainbow || state.rainbow);
                prop_assert!((0.0..360.0).contains(&state.grid_hue));
                prop_assert!(state.player.trail.len() <= TRAIL_LENGTH);
                prev_score = state.score;
                prev_mult = state.multiplier;
                prev_speed = state.speed;
                was_rainbow = state.rainbow;
            }
            prop_assert!(deaths <= 1);
        }
    }
}
