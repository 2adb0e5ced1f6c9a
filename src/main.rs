//! Neon Ascent entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, FocusEvent, KeyboardEvent, MouseEvent, TouchEvent};

    use neon_ascent::audio::AudioManager;
    use neon_ascent::consts::DEATH_PAUSE_MS;
    use neon_ascent::platform::{Key, KeyValueStore, LocalStore, MemoryStore, TickInput};
    use neon_ascent::render::{Canvas2d, Surface};
    use neon_ascent::sim::{GamePhase, RunId};
    use neon_ascent::{Error, GameLoop, LoopControl, Result};

    /// Game instance holding all browser-side state
    struct Game {
        game: GameLoop,
        canvas: Canvas2d,
        input: TickInput,
        document: Document,
    }

    impl Game {
        /// Size the canvas to its container
        fn fit_canvas(&self) {
            let container = self
                .document
                .get_element_by_id("game-container")
                .unwrap_or_else(|| self.canvas.canvas().clone().into());
            self.canvas
                .fit_to(container.client_width(), container.client_height());
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let state = self.game.state();
            self.set_text("score", &state.score.to_string());
            self.set_text("multiplier", &state.multiplier.to_string());
        }

        /// Restart the multiplier pop animation
        fn flash_multiplier(&self) {
            if let Some(el) = self.document.get_element_by_id("multiplier") {
                let classes = el.class_list();
                let _ = classes.remove_1("pop");
                // Reading layout restarts the CSS animation
                let _ = el.client_width();
                let _ = classes.add_1("pop");
            }
        }

        fn show_game_over(&self) {
            self.set_text("final-score", &self.game.state().score.to_string());
            self.set_text("high-score", &self.game.high_score().to_string());
            self.set_hidden("game-over-screen", false);
        }

        /// Canvas-relative x of a viewport x coordinate
        fn canvas_x(&self, client_x: i32) -> f32 {
            let rect = self.canvas.canvas().get_bounding_client_rect();
            (client_x as f64 - rect.left()) as f32
        }
    }

    pub fn run() -> Result<()> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Neon Ascent starting...");

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::SurfaceUnavailable("no document".into()))?;
        let canvas = Canvas2d::from_element_id("gameCanvas")?;

        let store: Box<dyn KeyValueStore> = match LocalStore::open() {
            Some(store) => Box::new(store),
            None => {
                log::warn!("LocalStorage unavailable - scores won't persist");
                Box::new(MemoryStore::new())
            }
        };
        let field = canvas.field();
        let game = GameLoop::new(store, AudioManager::browser(), field);

        let game = Rc::new(RefCell::new(Game {
            game,
            canvas,
            input: TickInput::default(),
            document,
        }));
        game.borrow().fit_canvas();
        game.borrow().set_text("high-score", &game.borrow().game.high_score().to_string());

        setup_resize(game.clone());
        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_focus_mute(game);

        log::info!("Neon Ascent ready");
        Ok(())
    }

    /// Start (or restart) a run and arm whatever loops aren't running
    fn start_game(game: &Rc<RefCell<Game>>) {
        let (outcome, audio) = {
            let mut g = game.borrow_mut();
            g.fit_canvas();
            let field = g.canvas.field();
            let seed = js_sys::Date::now() as u64;
            let outcome = g.game.start(seed, field);
            g.input.end_frame();
            g.set_hidden("start-screen", true);
            g.set_hidden("game-over-screen", true);
            g.update_hud();
            (outcome, g.game.audio().clone())
        };

        if outcome.arm_frame_loop {
            request_animation_frame(game.clone());
        }
        if outcome.arm_audio_loop {
            request_audio_pump(audio);
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let (control, pending) = {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;
            let control = g.game.frame(time, &g.input, &mut g.canvas);
            g.input.end_frame();
            g.update_hud();
            if g.game.take_level_up().is_some() {
                g.flash_multiplier();
            }
            (control, g.game.take_pending_game_over())
        };

        if let Some(run) = pending {
            schedule_game_over(game.clone(), run);
        }
        if control == LoopControl::Continue {
            request_animation_frame(game);
        }
    }

    /// Music scheduling runs on its own display callback chain
    fn request_audio_pump(audio: AudioManager) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            if audio.pump() {
                request_audio_pump(audio);
            }
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn schedule_game_over(game: Rc<RefCell<Game>>, run: RunId) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move || {
            let mut g = game.borrow_mut();
            if g.game.finish_run(run) {
                g.show_game_over();
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            DEATH_PAUSE_MS,
        );
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow().fit_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = game.borrow().canvas.canvas().clone();

        // Keyboard
        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    game.borrow_mut().input.set_key(key, down);
                }
            });
            let _ =
                window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move - place the ship under the pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.game.state().phase == GamePhase::Playing {
                    let x = g.canvas_x(event.client_x());
                    g.input.pointer_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.game.state().phase != GamePhase::Playing {
                    return;
                }
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let x = g.canvas_x(touch.client_x());
                    g.input.pointer_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = game.borrow().document.clone();
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{}", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                start_game(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Silence audio while the window is out of focus
    fn setup_focus_mute(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event_name, blurred) in [("blur", true), ("focus", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: FocusEvent| {
                let g = game.borrow();
                if g.game.settings().mute_on_blur {
                    g.game.audio().set_blurred(blurred);
                    log::debug!("Window {}", event_name);
                }
            });
            let _ =
                window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Neon Ascent (native) starting...");
    log::info!("Native mode runs a headless autopilot demo - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::rc::Rc;

    use neon_ascent::audio::{AudioManager, OfflineSink};
    use neon_ascent::consts::DEATH_PAUSE_MS;
    use neon_ascent::platform::{MemoryStore, TickInput};
    use neon_ascent::render::HeadlessSurface;
    use neon_ascent::sim::{Field, GameState, RunId};
    use neon_ascent::{GameLoop, LoopControl};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after two simulated minutes
    const MAX_FRAMES: u32 = 60 * 120;

    /// Headless run steered by a simple dodging autopilot
    pub fn run(seed: u64) {
        let field = Field::new(400.0, 600.0);
        let sink = Rc::new(OfflineSink::new());
        let audio = AudioManager::new(sink.clone());
        let mut game = GameLoop::new(Box::new(MemoryStore::new()), audio.clone(), field);
        let mut surface = HeadlessSurface::new(field.width, field.height);

        let outcome = game.start(seed, field);
        let mut pumping = outcome.arm_audio_loop;
        let mut game_over_at: Option<(f64, RunId)> = None;
        let mut time = 0.0;

        for _ in 0..MAX_FRAMES {
            let input = autopilot(game.state());
            surface.clear_ops();
            if game.frame(time, &input, &mut surface) == LoopControl::Stop {
                break;
            }
            if pumping {
                pumping = audio.pump();
            }
            if let Some(run) = game.take_pending_game_over() {
                game_over_at = Some((time + DEATH_PAUSE_MS as f64, run));
            }
            if let Some((at, run)) = game_over_at {
                if time >= at {
                    game.finish_run(run);
                    game_over_at = None;
                }
            }

            time += FRAME_MS;
            sink.advance(FRAME_MS / 1000.0);
        }

        let state = game.state();
        log::info!(
            "Demo finished: score {}, multiplier x{}, {} obstacles cleared, {:?}",
            state.score,
            state.multiplier,
            state.obstacles_cleared,
            state.phase
        );
        log::info!(
            "{} tones scheduled, final tempo {} bpm",
            sink.played().len(),
            audio.tempo().bpm()
        );
    }

    /// Dodge the nearest obstacle heading for the ship, otherwise drift
    /// toward the nearest collectable
    fn autopilot(state: &GameState) -> TickInput {
        let player = &state.player;
        let left = player.pos.x;
        let right = player.pos.x + player.size.x;
        let center = player.center().x;
        let mut input = TickInput::default();

        let threat = state
            .obstacles
            .live()
            .filter(|o| o.pos.y < player.pos.y + player.size.y && o.pos.y > player.pos.y - 250.0)
            .filter(|o| o.pos.x < right + 10.0 && o.pos.x + o.size.x > left - 10.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        if let Some(o) = threat {
            let room_left = o.pos.x;
            let room_right = state.field.width - (o.pos.x + o.size.x);
            if room_left > room_right {
                input.left = true;
            } else {
                input.right = true;
            }
            return input;
        }

        if let Some(c) = state
            .collectables
            .live()
            .min_by(|a, b| a.pos.distance(player.center()).total_cmp(&b.pos.distance(player.center())))
        {
            if c.pos.x < center - 5.0 {
                input.left = true;
            } else if c.pos.x > center + 5.0 {
                input.right = true;
            }
        }
        input
    }
}
