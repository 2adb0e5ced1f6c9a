//! Web Audio output

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::MASTER_GAIN;
use super::tone::{Tone, ToneSink, Waveform};
use crate::error::{Error, Result};

/// Envelope floor (exponential ramps can't reach zero)
const SILENCE: f32 = 0.01;

/// Plays tones through an `AudioContext`, every voice routed into one bus
pub struct WebAudioSink {
    ctx: AudioContext,
    bus: GainNode,
}

impl WebAudioSink {
    pub fn new() -> Result<Self> {
        let ctx = AudioContext::new()
            .map_err(|e| Error::AudioUnavailable(format!("AudioContext: {e:?}")))?;
        let bus = ctx
            .create_gain()
            .map_err(|e| Error::AudioUnavailable(format!("output bus: {e:?}")))?;
        bus.gain().set_value(MASTER_GAIN);
        bus.connect_with_audio_node(&ctx.destination())
            .map_err(|e| Error::AudioUnavailable(format!("output bus: {e:?}")))?;
        Ok(Self { ctx, bus })
    }

    /// Oscillator wired through its own envelope gain into the bus
    fn create_osc(&self, freq: f32, waveform: Waveform) -> Option<(OscillatorNode, GainNode)> {
        let osc = self.ctx.create_oscillator().ok()?;
        let gain = self.ctx.create_gain().ok()?;

        osc.set_type(oscillator_type(waveform));
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&self.bus).ok()?;

        Some((osc, gain))
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

impl ToneSink for WebAudioSink {
    fn now(&self) -> f64 {
        self.ctx.current_time()
    }

    fn resume(&self) {
        // Browsers keep the context suspended until a user gesture
        if self.ctx.state() == AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }

    fn play(&self, tone: &Tone) {
        let Some((osc, gain)) = self.create_osc(tone.freq, tone.waveform) else {
            return;
        };
        let t = tone.start;
        let end = tone.stop_time();

        gain.gain()
            .set_value_at_time(tone.volume.max(SILENCE), t)
            .ok();
        gain.gain().exponential_ramp_to_value_at_time(SILENCE, end).ok();

        if let Some(target) = tone.glide_to {
            osc.frequency().set_value_at_time(tone.freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(target, end)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(end).ok();
    }
}
