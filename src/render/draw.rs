//! Entity drawing
//!
//! Neon look: everything glows (shadow blur in its own color) over a
//! translucent backdrop that leaves motion streaks.

use super::surface::Surface;
use crate::color::Color;
use crate::sim::{
    Collectable, FloatingText, GameState, GridLine, Layer, Obstacle, Particle, Player,
};

/// Font for floating labels
pub const LABEL_FONT: &str = "bold 20px \"Orbitron\"";

/// Vertical lines of the perspective floor
const PERSPECTIVE_LINES: f32 = 10.0;
/// How far the floor lines fan out at the bottom edge
const PERSPECTIVE_SPREAD: f32 = 3.0;

/// Renderer options
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    pub show_trail: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self { show_trail: true }
    }
}

/// Something that can paint itself
pub trait Draw {
    fn draw(&self, surface: &mut dyn Surface, scene: &Scene);
}

/// Per-frame values shared by all drawables
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub grid_color: Color,
    pub width: f32,
    pub height: f32,
    pub options: DrawOptions,
}

impl Scene {
    pub fn new(state: &GameState, options: DrawOptions) -> Self {
        Self {
            grid_color: state.grid_color(),
            width: state.field.width,
            height: state.field.height,
            options,
        }
    }
}

/// Draw one layer of the game state
pub fn draw_layer(
    surface: &mut dyn Surface,
    layer: Layer,
    state: &GameState,
    options: DrawOptions,
) {
    let scene = Scene::new(state, options);
    match layer {
        Layer::Backdrop => backdrop(surface, &scene),
        Layer::Grid => {
            perspective_grid(surface, &scene);
            for line in state.grid_lines.live() {
                line.draw(surface, &scene);
            }
        }
        Layer::Collectables => {
            for c in state.collectables.live() {
                c.draw(surface, &scene);
            }
        }
        Layer::Player => state.player.draw(surface, &scene),
        Layer::Obstacles => {
            for o in state.obstacles.live() {
                o.draw(surface, &scene);
            }
        }
        Layer::Particles => {
            for p in state.particles.live() {
                p.draw(surface, &scene);
            }
        }
        Layer::Texts => {
            for t in state.texts.live() {
                t.draw(surface, &scene);
            }
        }
    }
}

/// Fade the previous frame instead of clearing it
pub fn backdrop(surface: &mut dyn Surface, scene: &Scene) {
    surface.set_fill(Color::BACKDROP);
    surface.fill_rect(0.0, 0.0, scene.width, scene.height);
}

/// Floor lines fanning out from the top toward the viewer
pub fn perspective_grid(surface: &mut dyn Surface, scene: &Scene) {
    surface.set_stroke(scene.grid_color);
    surface.begin_path();
    let center_x = scene.width / 2.0;
    let step = scene.width / PERSPECTIVE_LINES;
    if step > 0.0 {
        let mut x = 0.0;
        while x <= scene.width {
            surface.move_to(x, 0.0);
            surface.line_to(center_x + (x - center_x) * PERSPECTIVE_SPREAD, scene.height);
            x += step;
        }
    }
    surface.stroke();
}

impl Draw for GridLine {
    fn draw(&self, surface: &mut dyn Surface, scene: &Scene) {
        surface.set_stroke(scene.grid_color);
        surface.set_line_width(2.0);
        surface.begin_path();
        surface.move_to(0.0, self.y);
        surface.line_to(scene.width, self.y);
        surface.stroke();
    }
}

impl Draw for Collectable {
    fn draw(&self, surface: &mut dyn Surface, _scene: &Scene) {
        surface.set_shadow(15.0, Color::GOLD);
        surface.set_fill(Color::GOLD);
        surface.begin_path();
        surface.circle(self.pos.x, self.pos.y, self.radius);
        surface.fill();

        // Shine
        surface.set_fill(Color::WHITE);
        surface.begin_path();
        surface.circle(self.pos.x - 4.0, self.pos.y - 4.0, 3.0);
        surface.fill();
        surface.set_shadow(0.0, Color::GOLD);
    }
}

impl Draw for Player {
    fn draw(&self, surface: &mut dyn Surface, scene: &Scene) {
        if !self.visible {
            return;
        }

        if scene.options.show_trail {
            let len = self.trail.len() as f32;
            surface.set_fill(self.color);
            for (i, point) in self.trail.iter().enumerate() {
                surface.set_alpha(i as f32 / len * 0.5);
                surface.fill_rect(point.x, point.y, self.size.x, self.size.y);
            }
            surface.set_alpha(1.0);
        }

        // Ship: glowing triangle pointing up
        surface.set_shadow(20.0, self.color);
        surface.set_fill(self.color);
        surface.begin_path();
        surface.move_to(self.pos.x + self.size.x / 2.0, self.pos.y);
        surface.line_to(self.pos.x + self.size.x, self.pos.y + self.size.y);
        surface.line_to(self.pos.x, self.pos.y + self.size.y);
        surface.close_path();
        surface.fill();
        surface.set_shadow(0.0, self.color);
    }
}

impl Draw for Obstacle {
    fn draw(&self, surface: &mut dyn Surface, _scene: &Scene) {
        surface.set_shadow(15.0, Color::MAGENTA);
        surface.set_fill(Color::MAGENTA);
        surface.fill_rect(self.pos.x, self.pos.y, self.size.x, self.size.y);
        surface.set_shadow(0.0, Color::MAGENTA);
    }
}

impl Draw for Particle {
    fn draw(&self, surface: &mut dyn Surface, _scene: &Scene) {
        surface.save();
        surface.set_alpha(self.alpha.max(0.0));
        surface.set_fill(self.color);
        surface.begin_path();
        surface.circle(self.pos.x, self.pos.y, self.radius);
        surface.fill();
        surface.restore();
    }
}

impl Draw for FloatingText {
    fn draw(&self, surface: &mut dyn Surface, _scene: &Scene) {
        surface.save();
        surface.set_alpha(self.alpha.max(0.0));
        surface.set_fill(self.color);
        surface.set_shadow(5.0, self.color);
        surface.fill_text(&self.text, self.pos.x, self.pos.y, LABEL_FONT);
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{DrawOp, HeadlessSurface};
    use crate::sim::{Field, GameState};
    use glam::Vec2;

    fn state() -> GameState {
        GameState::playing(3, Field::new(400.0, 600.0))
    }

    #[test]
    fn test_backdrop_covers_field() {
        let mut surface = HeadlessSurface::new(400.0, 600.0);
        draw_layer(&mut surface, Layer::Backdrop, &state(), DrawOptions::default());
        assert_eq!(
            surface.ops,
            vec![DrawOp::FillRect {
                x: 0.0,
                y: 0.0,
                w: 400.0,
                h: 600.0,
                color: Color::BACKDROP,
                alpha: 1.0,
            }]
        );
    }

    #[test]
    fn test_hidden_player_draws_nothing() {
        let mut surface = HeadlessSurface::new(400.0, 600.0);
        let mut state = state();
        state.player.visible = false;
        draw_layer(&mut surface, Layer::Player, &state, DrawOptions::default());
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn test_trail_can_be_disabled() {
        let mut state = state();
        state.player.trail.push_back(Vec2::new(10.0, 10.0));
        state.player.trail.push_back(Vec2::new(20.0, 10.0));

        let mut surface = HeadlessSurface::new(400.0, 600.0);
        draw_layer(&mut surface, Layer::Player, &state, DrawOptions::default());
        let with_trail = surface.ops.len();

        let mut surface = HeadlessSurface::new(400.0, 600.0);
        draw_layer(&mut surface, Layer::Player, &state, DrawOptions { show_trail: false });
        assert_eq!(with_trail, surface.ops.len() + 2);
    }

    #[test]
    fn test_paint_state_restored() {
        let mut state = state();
        state.burst(Vec2::new(50.0, 50.0), Color::GOLD);
        state
            .texts
            .push(FloatingText::new("LEVEL UP!", Vec2::new(200.0, 300.0), Color::WHITE));

        let mut surface = HeadlessSurface::new(400.0, 600.0);
        draw_layer(&mut surface, Layer::Particles, &state, DrawOptions::default());
        draw_layer(&mut surface, Layer::Texts, &state, DrawOptions::default());
        assert_eq!(surface.saved_depth(), 0);
        assert_eq!(surface.alpha(), 1.0);
        assert_eq!(surface.blur(), 0.0);
        assert_eq!(surface.texts(), vec!["LEVEL UP!"]);
    }

    #[test]
    fn test_grid_uses_level_color() {
        let mut state = state();
        state.grid_hue = 300.0;
        state.grid_lines.push(GridLine::default());

        let mut surface = HeadlessSurface::new(400.0, 600.0);
        draw_layer(&mut surface, Layer::Grid, &state, DrawOptions::default());
        assert!(surface.ops.iter().all(|op| matches!(
            op,
            DrawOp::Stroke { color, .. } if *color == Color::grid(300.0)
        )));
        assert_eq!(surface.ops.len(), 2);
    }
}
