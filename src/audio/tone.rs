//! Tone descriptions and the sinks that play them

use std::cell::{Cell, RefCell};

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// A single enveloped oscillator voice, scheduled on the audio clock.
/// Gain starts at `volume` and decays exponentially to 0.01 by the stop time.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub waveform: Waveform,
    /// Start time (audio clock seconds)
    pub start: f64,
    /// Seconds until the voice stops
    pub duration: f64,
    pub volume: f32,
    /// Exponential pitch sweep target, reached at the stop time
    pub glide_to: Option<f32>,
}

impl Tone {
    pub fn new(freq: f32, waveform: Waveform, start: f64, duration: f64, volume: f32) -> Self {
        Self {
            freq,
            waveform,
            start,
            duration,
            volume,
            glide_to: None,
        }
    }

    pub fn glide(mut self, to: f32) -> Self {
        self.glide_to = Some(to);
        self
    }

    pub fn stop_time(&self) -> f64 {
        self.start + self.duration
    }
}

/// Audio output: a clock plus a way to schedule voices on it
pub trait ToneSink {
    /// Audio clock (seconds)
    fn now(&self) -> f64;

    /// Wake a suspended clock (browsers suspend until a user gesture)
    fn resume(&self) {}

    fn play(&self, tone: &Tone);
}

/// Sink used when no audio device is available
#[derive(Debug, Default)]
pub struct SilentSink;

impl ToneSink for SilentSink {
    fn now(&self) -> f64 {
        0.0
    }

    fn play(&self, _tone: &Tone) {}
}

/// Sink with a manually driven clock that records what it was asked to
/// play. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct OfflineSink {
    clock: Cell<f64>,
    played: RefCell<Vec<Tone>>,
}

impl OfflineSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, seconds: f64) {
        self.clock.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.clock.set(self.clock.get() + seconds);
    }

    /// Tones received so far
    pub fn played(&self) -> Vec<Tone> {
        self.played.borrow().clone()
    }

    /// Take and forget received tones
    pub fn take(&self) -> Vec<Tone> {
        self.played.borrow_mut().drain(..).collect()
    }
}

impl ToneSink for OfflineSink {
    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn play(&self, tone: &Tone) {
        self.played.borrow_mut().push(tone.clone());
    }
}
