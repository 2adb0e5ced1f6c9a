//! Audio system
//!
//! Everything is synthesized from oscillators, no sample files. The
//! [`AudioManager`] owns a [`ToneSink`] (Web Audio in the browser, an
//! offline recorder elsewhere) and the lookahead [`MusicSequencer`].

mod sequencer;
mod tone;
#[cfg(target_arch = "wasm32")]
mod web;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub use sequencer::{
    ARPEGGIO, BASS_FREQ, LOOKAHEAD, MAX_BPM, MusicSequencer, NOTE_LENGTH, Note, START_BPM, Tempo,
};
pub use tone::{OfflineSink, SilentSink, Tone, ToneSink, Waveform};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

use crate::settings::Settings;

/// Fixed gain of the output bus every voice feeds
pub const MASTER_GAIN: f32 = 0.3;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Collectable picked up
    Collect,
    /// Player hit an obstacle
    Crash,
}

#[derive(Debug, Clone, Copy)]
struct Mix {
    music: f32,
    sfx: f32,
    /// Silenced while the page is out of focus
    blurred: bool,
}

impl Default for Mix {
    fn default() -> Self {
        Self {
            music: 1.0,
            sfx: 1.0,
            blurred: false,
        }
    }
}

impl Mix {
    fn music(&self) -> f32 {
        if self.blurred { 0.0 } else { self.music }
    }

    fn sfx(&self) -> f32 {
        if self.blurred { 0.0 } else { self.sfx }
    }
}

/// Audio manager for the game. Clones share the same sink, sequencer and
/// tempo, so the frame loop and the audio pump can each hold one.
#[derive(Clone)]
pub struct AudioManager {
    sink: Rc<dyn ToneSink>,
    music: Rc<RefCell<MusicSequencer>>,
    tempo: Tempo,
    mix: Rc<Cell<Mix>>,
}

impl AudioManager {
    pub fn new(sink: Rc<dyn ToneSink>) -> Self {
        let tempo = Tempo::new();
        Self {
            sink,
            music: Rc::new(RefCell::new(MusicSequencer::new(tempo.clone()))),
            tempo,
            mix: Rc::new(Cell::new(Mix::default())),
        }
    }

    /// Manager that plays nothing
    pub fn silent() -> Self {
        Self::new(Rc::new(SilentSink))
    }

    /// Web Audio output, or silence if the browser refuses a context
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        match WebAudioSink::new() {
            Ok(sink) => Self::new(Rc::new(sink)),
            Err(e) => {
                log::warn!("{} - audio disabled", e);
                Self::silent()
            }
        }
    }

    pub fn apply_settings(&self, settings: &Settings) {
        let mut mix = self.mix.get();
        mix.music = settings.music_gain();
        mix.sfx = settings.sfx_gain();
        self.mix.set(mix);
    }

    /// Silence output while the window is unfocused
    pub fn set_blurred(&self, blurred: bool) {
        let mut mix = self.mix.get();
        mix.blurred = blurred;
        self.mix.set(mix);
    }

    /// Shared tempo handle
    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn is_playing(&self) -> bool {
        self.music.borrow().is_playing()
    }

    /// Start the music. Returns true when the caller must arm a pump loop
    /// that calls [`AudioManager::pump`] every display frame.
    pub fn start_music(&self) -> bool {
        self.sink.resume();
        let armed = self.music.borrow_mut().start(self.sink.now());
        if armed {
            log::debug!("Music started at {} bpm", self.tempo.bpm());
        }
        armed
    }

    /// Stop scheduling notes; queued ones ring out
    pub fn stop_music(&self) {
        self.music.borrow_mut().stop();
    }

    /// Schedule every note inside the lookahead window. Returns whether the
    /// pump loop should run again.
    pub fn pump(&self) -> bool {
        let notes = self.music.borrow_mut().due_notes(self.sink.now());
        let volume = self.mix.get().music();
        if volume > 0.0 {
            for note in &notes {
                self.sink.play(&Tone::new(
                    note.freq,
                    Waveform::Square,
                    note.time,
                    0.1,
                    0.1 * volume,
                ));
                if note.bass {
                    self.sink.play(&Tone::new(
                        BASS_FREQ,
                        Waveform::Sawtooth,
                        note.time,
                        0.3,
                        0.2 * volume,
                    ));
                }
            }
        }
        self.music.borrow_mut().keep_pumping()
    }

    /// Play a sound effect now
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.mix.get().sfx();
        if vol <= 0.0 {
            return;
        }

        self.sink.resume();
        let t = self.sink.now();
        match effect {
            SoundEffect::Collect => {
                self.sink
                    .play(&Tone::new(1200.0, Waveform::Sine, t, 0.1, 0.2 * vol));
                self.sink
                    .play(&Tone::new(1800.0, Waveform::Square, t + 0.05, 0.2, 0.1 * vol));
            }
            SoundEffect::Crash => {
                self.sink
                    .play(&Tone::new(100.0, Waveform::Sawtooth, t, 0.5, 0.3 * vol).glide(10.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> (Rc<OfflineSink>, AudioManager) {
        let sink = Rc::new(OfflineSink::new());
        let audio = AudioManager::new(sink.clone());
        (sink, audio)
    }

    #[test]
    fn test_collect_chime() {
        let (sink, audio) = offline();
        sink.set_time(2.0);
        audio.play(SoundEffect::Collect);
        let played = sink.take();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0], Tone::new(1200.0, Waveform::Sine, 2.0, 0.1, 0.2));
        assert_eq!(played[1].freq, 1800.0);
        assert_eq!(played[1].waveform, Waveform::Square);
        assert!((played[1].start - 2.05).abs() < 1e-9);
    }

    #[test]
    fn test_crash_sweeps_down() {
        let (sink, audio) = offline();
        audio.play(SoundEffect::Crash);
        let played = sink.take();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].waveform, Waveform::Sawtooth);
        assert_eq!(played[0].glide_to, Some(10.0));
        assert_eq!(played[0].duration, 0.5);
    }

    #[test]
    fn test_effects_ignore_sequencer_state() {
        let (sink, audio) = offline();
        audio.start_music();
        audio.stop_music();
        audio.play(SoundEffect::Crash);
        assert_eq!(sink.take().len(), 1);
    }

    #[test]
    fn test_pump_plays_arpeggio_and_bass() {
        let (sink, audio) = offline();
        assert!(audio.start_music());
        assert!(audio.pump());
        let played = sink.take();
        // First step carries the bass
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].freq, ARPEGGIO[0]);
        assert_eq!(played[1].freq, BASS_FREQ);
        assert_eq!(played[1].waveform, Waveform::Sawtooth);

        sink.advance(1.0);
        audio.pump();
        assert!(sink.take().iter().all(|t| t.start < 1.0 + LOOKAHEAD));
    }

    #[test]
    fn test_stop_ends_pump_loop() {
        let (sink, audio) = offline();
        audio.start_music();
        audio.stop_music();
        assert!(!audio.is_playing());
        assert!(!audio.pump());
        assert!(sink.played().is_empty());
    }

    #[test]
    fn test_mute_silences_everything() {
        let (sink, audio) = offline();
        audio.apply_settings(&Settings {
            muted: true,
            ..Default::default()
        });
        audio.start_music();
        audio.pump();
        audio.play(SoundEffect::Collect);
        assert!(sink.played().is_empty());
        // Sequencer kept its place while muted
        assert!(audio.is_playing());
    }

    #[test]
    fn test_blur_and_volume_scaling() {
        let (sink, audio) = offline();
        audio.apply_settings(&Settings {
            sfx_volume: 0.5,
            ..Default::default()
        });
        audio.set_blurred(true);
        audio.play(SoundEffect::Crash);
        assert!(sink.played().is_empty());

        audio.set_blurred(false);
        audio.play(SoundEffect::Crash);
        assert!((sink.take()[0].volume - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_clones_share_tempo() {
        let (_sink, audio) = offline();
        let pump_side = audio.clone();
        audio.tempo().increase();
        assert_eq!(pump_side.tempo().bpm(), 145);
    }
}
