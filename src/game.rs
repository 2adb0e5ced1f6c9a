//! Frame loop controller
//!
//! Owns the current run and everything that outlives it (audio, storage,
//! best score). The platform layer calls [`GameLoop::frame`] once per display
//! refresh and reschedules only while it answers [`LoopControl::Continue`].

use crate::audio::{AudioManager, SoundEffect};
use crate::highscores::HighScore;
use crate::platform::{KeyValueStore, TickInput};
use crate::render::{DrawOptions, Surface, draw_layer};
use crate::settings::Settings;
use crate::sim::{Field, GameEvent, GamePhase, GameState, RunId, frame_dt, tick_with};

/// Whether the frame loop should request another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Callbacks the platform must arm after a start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOutcome {
    /// No frame loop is running
    pub arm_frame_loop: bool,
    /// No audio pump loop is running
    pub arm_audio_loop: bool,
}

/// Game loop state
pub struct GameLoop {
    state: GameState,
    audio: AudioManager,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
    high_score: HighScore,
    options: DrawOptions,
    last_timestamp: Option<f64>,
    run: RunId,
    /// Run that died and still waits for its game over screen
    pending_game_over: Option<RunId>,
    /// Multiplier reached by a level up the HUD hasn't shown yet
    level_up: Option<u32>,
    frame_loop_armed: bool,
}

impl GameLoop {
    pub fn new(store: Box<dyn KeyValueStore>, audio: AudioManager, field: Field) -> Self {
        let high_score = HighScore::load(store.as_ref());
        let settings = Settings::load(store.as_ref());
        let mut game = Self {
            state: GameState::new(0, field),
            audio,
            store,
            settings: Settings::default(),
            high_score,
            options: DrawOptions::default(),
            last_timestamp: None,
            run: RunId::default(),
            pending_game_over: None,
            level_up: None,
            frame_loop_armed: false,
        };
        game.apply_settings(settings);
        game
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.apply_settings(&settings);
        self.options.show_trail = settings.show_trail;
        self.settings = settings;
    }

    /// Apply and persist new settings
    pub fn save_settings(&mut self, settings: Settings) {
        if let Err(e) = settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {}", e);
        }
        self.apply_settings(settings);
    }

    /// Begin a new run, replacing whatever was there
    pub fn start(&mut self, seed: u64, field: Field) -> StartOutcome {
        self.run = self.run.next();
        self.pending_game_over = None;
        self.level_up = None;
        self.state = GameState::playing(seed, field);
        self.last_timestamp = None;

        self.audio.tempo().reset();
        let arm_audio_loop = self.audio.start_music();
        let arm_frame_loop = !self.frame_loop_armed;
        self.frame_loop_armed = true;

        log::info!("Run {} started (seed {})", self.run.0, seed);
        StartOutcome {
            arm_frame_loop,
            arm_audio_loop,
        }
    }

    /// Run one display frame: simulate, draw and react to what happened
    pub fn frame(
        &mut self,
        timestamp: f64,
        input: &TickInput,
        surface: &mut dyn Surface,
    ) -> LoopControl {
        if !self.state.is_active() {
            self.frame_loop_armed = false;
            return LoopControl::Stop;
        }

        let dt = frame_dt(self.last_timestamp, timestamp);
        self.last_timestamp = Some(timestamp);
        self.state.field = surface.field();

        let options = self.options;
        tick_with(&mut self.state, input, dt, |layer, state| {
            draw_layer(surface, layer, state, options)
        });

        for event in self.state.drain_events() {
            self.handle(event);
        }
        LoopControl::Continue
    }

    fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::TempoUp => {
                self.audio.tempo().increase();
            }
            GameEvent::Collected { .. } => self.audio.play(SoundEffect::Collect),
            GameEvent::Died { score } => {
                self.audio.stop_music();
                self.audio.play(SoundEffect::Crash);
                if self.high_score.record(score, self.store.as_mut()) {
                    log::info!("New high score: {}", score);
                }
                self.pending_game_over = Some(self.run);
            }
            GameEvent::LevelUp {
                level, multiplier, ..
            } => {
                self.level_up = Some(multiplier);
                log::info!("Level {} (x{} multiplier)", level, multiplier);
            }
            GameEvent::Rainbow { cleared } => {
                log::info!("Rainbow mode at {} cleared", cleared);
            }
        }
    }

    /// Run that needs a delayed game over callback, if any
    pub fn take_pending_game_over(&mut self) -> Option<RunId> {
        self.pending_game_over.take()
    }

    /// Multiplier of a level up since the last call, for a HUD flash
    pub fn take_level_up(&mut self) -> Option<u32> {
        self.level_up.take()
    }

    /// Delayed game over. Callbacks for a run that has since been replaced
    /// are ignored. Returns true when the game over screen should show.
    pub fn finish_run(&mut self, run: RunId) -> bool {
        if run != self.run || self.state.phase != GamePhase::Dying {
            log::debug!("Ignoring stale game over for run {}", run.0);
            return false;
        }
        self.state.phase = GamePhase::GameOver;
        log::info!("Game over (score {}, best {})", self.state.score, self.high_score.best);
        true
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best
    }

    pub fn run(&self) -> RunId {
        self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{OfflineSink, Waveform};
    use crate::platform::MemoryStore;
    use crate::render::HeadlessSurface;
    use crate::sim::{Obstacle, collision::kill_player};
    use glam::Vec2;
    use std::rc::Rc;

    const FIELD: Field = Field {
        width: 400.0,
        height: 600.0,
    };
    const FRAME_MS: f64 = 16.0;

    fn game_with(store: MemoryStore) -> (Rc<OfflineSink>, GameLoop) {
        let sink = Rc::new(OfflineSink::new());
        let audio = AudioManager::new(sink.clone());
        (sink, GameLoop::new(Box::new(store), audio, FIELD))
    }

    fn surface() -> HeadlessSurface {
        HeadlessSurface::new(FIELD.width, FIELD.height)
    }

    /// Drop an obstacle right onto the player
    fn crash(game: &mut GameLoop) {
        let player = &game.state().player;
        let obstacle = Obstacle {
            pos: player.pos,
            size: Vec2::new(40.0, 20.0),
            gone: false,
        };
        game.state_mut().obstacles.push(obstacle);
    }

    #[test]
    fn test_start_arms_loops_once() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        let first = game.start(1, FIELD);
        assert!(first.arm_frame_loop);
        assert!(first.arm_audio_loop);
        assert_eq!(game.state().phase, GamePhase::Playing);

        let again = game.start(2, FIELD);
        assert!(!again.arm_frame_loop);
        assert!(!again.arm_audio_loop);
        assert_eq!(game.run(), RunId(2));
    }

    #[test]
    fn test_not_started_stops_immediately() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        let mut surface = surface();
        let control = game.frame(0.0, &TickInput::default(), &mut surface);
        assert_eq!(control, LoopControl::Stop);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn test_frame_draws_layers_in_order() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        let mut surface = surface();
        assert_eq!(
            game.frame(0.0, &TickInput::default(), &mut surface),
            LoopControl::Continue
        );
        // Backdrop comes first
        assert!(matches!(
            surface.ops.first(),
            Some(crate::render::DrawOp::FillRect { w, .. }) if *w == FIELD.width
        ));
    }

    #[test]
    fn test_crash_stops_music_and_plays_crash_same_tick() {
        let (sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        assert!(game.audio().is_playing());
        let center = game.state().player.center();

        crash(&mut game);
        sink.take();
        game.frame(0.0, &TickInput::default(), &mut surface());

        assert_eq!(game.state().phase, GamePhase::Dying);
        assert!(!game.audio().is_playing());
        let played = sink.take();
        assert!(
            played
                .iter()
                .any(|t| t.waveform == Waveform::Sawtooth && t.glide_to == Some(10.0))
        );
        assert!(
            game.state()
                .particles
                .live()
                .all(|p| p.pos.distance(center) < 1e-3)
        );
        assert_eq!(game.take_pending_game_over(), Some(game.run()));
        assert_eq!(game.take_pending_game_over(), None);
    }

    #[test]
    fn test_dying_keeps_running_until_game_over() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        crash(&mut game);
        let mut surface = surface();
        let input = TickInput::default();

        let mut t = 0.0;
        for _ in 0..10 {
            assert_eq!(game.frame(t, &input, &mut surface), LoopControl::Continue);
            t += FRAME_MS;
        }

        let run = game.take_pending_game_over().unwrap();
        assert!(game.finish_run(run));
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert_eq!(game.frame(t, &input, &mut surface), LoopControl::Stop);

        // Next start needs a fresh frame loop
        assert!(game.start(2, FIELD).arm_frame_loop);
    }

    #[test]
    fn test_stale_game_over_ignored() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        crash(&mut game);
        game.frame(0.0, &TickInput::default(), &mut surface());
        let stale = game.take_pending_game_over().unwrap();

        // Restart during the death pause
        let outcome = game.start(2, FIELD);
        assert!(!outcome.arm_frame_loop);
        assert!(!game.finish_run(stale));
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(game.audio().is_playing());
    }

    #[test]
    fn test_finish_run_requires_death() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        assert!(!game.finish_run(game.run()));
        assert_eq!(game.state().phase, GamePhase::Playing);
    }

    #[test]
    fn test_high_score_survives_restart() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        game.state_mut().score = 420;
        kill_player(game.state_mut());
        game.frame(0.0, &TickInput::default(), &mut surface());
        assert_eq!(game.high_score(), 420);

        // Lower score doesn't replace it
        game.start(2, FIELD);
        game.state_mut().score = 10;
        kill_player(game.state_mut());
        game.frame(0.0, &TickInput::default(), &mut surface());
        assert_eq!(game.high_score(), 420);
    }

    #[test]
    fn test_high_score_loaded_from_store() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "1234").unwrap();
        let (_sink, game) = game_with(store);
        assert_eq!(game.high_score(), 1234);
    }

    #[test]
    fn test_tempo_follows_clears_and_resets() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        game.state_mut().events.push(GameEvent::TempoUp);
        game.frame(0.0, &TickInput::default(), &mut surface());
        assert_eq!(game.audio().tempo().bpm(), 145);

        game.start(2, FIELD);
        assert_eq!(game.audio().tempo().bpm(), 140);
    }

    #[test]
    fn test_settings_reach_renderer_and_audio() {
        let (sink, mut game) = game_with(MemoryStore::new());
        game.save_settings(Settings {
            muted: true,
            show_trail: false,
            ..Default::default()
        });
        assert!(!game.options.show_trail);
        game.audio().play(SoundEffect::Collect);
        assert!(sink.played().is_empty());

        // Persisted for the next session
        assert!(game.store.get(Settings::STORAGE_KEY).is_some());
    }

    #[test]
    fn test_level_up_reaches_hud_once() {
        let (_sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        assert_eq!(game.take_level_up(), None);

        game.state_mut().events.push(GameEvent::LevelUp {
            level: 2,
            hue: 300.0,
            multiplier: 2,
        });
        game.state_mut().events.push(GameEvent::Rainbow { cleared: 100 });
        game.frame(0.0, &TickInput::default(), &mut surface());
        assert_eq!(game.take_level_up(), Some(2));
        assert_eq!(game.take_level_up(), None);

        // A restart forgets an unshown flash
        game.state_mut().events.push(GameEvent::LevelUp {
            level: 3,
            hue: 60.0,
            multiplier: 3,
        });
        game.frame(FRAME_MS, &TickInput::default(), &mut surface());
        game.start(2, FIELD);
        assert_eq!(game.take_level_up(), None);
    }

    #[test]
    fn test_collect_plays_chime() {
        let (sink, mut game) = game_with(MemoryStore::new());
        game.start(1, FIELD);
        sink.take();
        game.state_mut().events.push(GameEvent::Collected {
            points: 100,
            pos: Vec2::ZERO,
        });
        game.frame(0.0, &TickInput::default(), &mut surface());
        assert!(sink.take().iter().any(|t| t.freq == 1200.0));
    }
}
