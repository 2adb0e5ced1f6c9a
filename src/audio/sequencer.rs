//! Lookahead music sequencer
//!
//! Notes are scheduled slightly ahead of the audio clock so callback jitter
//! never reaches the listener. Tempo is shared with the game through an
//! atomic, the only coupling between the two clocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Starting tempo (beats per minute)
pub const START_BPM: u32 = 140;
/// Tempo ceiling
pub const MAX_BPM: u32 = 200;
/// Tempo gained per increase signal
pub const BPM_STEP: u32 = 5;
/// How far ahead of the clock notes are scheduled (seconds)
pub const LOOKAHEAD: f64 = 0.1;
/// Note length as a fraction of a beat (16th notes)
pub const NOTE_LENGTH: f64 = 0.25;

/// C minor arpeggio, one entry per 16th note
pub const ARPEGGIO: [f32; 16] = [
    261.63, 311.13, 392.00, 523.25, // C4 Eb4 G4 C5
    311.13, 392.00, 523.25, 622.25, // Eb4 G4 C5 Eb5
    392.00, 523.25, 622.25, 783.99, // G4 C5 Eb5 G5
    523.25, 392.00, 311.13, 261.63, // back down
];
/// C2
pub const BASS_FREQ: f32 = 65.41;
/// A bass note lands on every n-th step
pub const BASS_EVERY: usize = 4;

/// Shared tempo handle
#[derive(Debug, Clone)]
pub struct Tempo(Arc<AtomicU32>);

impl Default for Tempo {
    fn default() -> Self {
        Self(Arc::new(AtomicU32::new(START_BPM)))
    }
}

impl Tempo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bpm(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Speed up by one step unless at the ceiling. Returns the new tempo.
    pub fn increase(&self) -> u32 {
        let prev = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bpm| {
                (bpm < MAX_BPM).then(|| (bpm + BPM_STEP).min(MAX_BPM))
            })
            .unwrap_or_else(|bpm| bpm);
        let bpm = self.bpm();
        if bpm != prev {
            log::debug!("Tempo {} -> {} bpm", prev, bpm);
        }
        bpm
    }

    pub fn reset(&self) {
        self.0.store(START_BPM, Ordering::Relaxed);
    }

    /// Seconds between consecutive notes
    pub fn note_interval(&self) -> f64 {
        60.0 / self.bpm() as f64 * NOTE_LENGTH
    }
}

/// A note due for playback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Audio clock time
    pub time: f64,
    /// Position in the (endless) sequence
    pub step: usize,
    pub freq: f32,
    /// Bass accompanies this step
    pub bass: bool,
}

impl Note {
    fn at(step: usize, time: f64) -> Self {
        Self {
            time,
            step,
            freq: ARPEGGIO[step % ARPEGGIO.len()],
            bass: step % BASS_EVERY == 0,
        }
    }
}

/// Sequencer state
#[derive(Debug, Clone)]
pub struct MusicSequencer {
    tempo: Tempo,
    playing: bool,
    next_note_time: f64,
    step: usize,
    /// A pump loop is currently re-arming itself
    pumping: bool,
}

impl MusicSequencer {
    pub fn new(tempo: Tempo) -> Self {
        Self {
            tempo,
            playing: false,
            next_note_time: 0.0,
            step: 0,
            pumping: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Start playing from `now`. Returns true when a pump loop needs to be
    /// armed (none is running).
    pub fn start(&mut self, now: f64) -> bool {
        if self.playing {
            return false;
        }
        self.playing = true;
        self.next_note_time = now;
        if self.pumping {
            return false;
        }
        self.pumping = true;
        true
    }

    /// Stop emitting notes; already scheduled ones ring out
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Notes whose start falls inside the lookahead window
    pub fn due_notes(&mut self, now: f64) -> Vec<Note> {
        let mut notes = Vec::new();
        if !self.playing {
            return notes;
        }

        let interval = self.tempo.note_interval();
        while self.next_note_time < now + LOOKAHEAD {
            notes.push(Note::at(self.step, self.next_note_time));
            self.next_note_time += interval;
            self.step = self.step.wrapping_add(1);
        }
        notes
    }

    /// Called by the pump loop after each run: whether to re-arm
    pub fn keep_pumping(&mut self) -> bool {
        if !self.playing {
            self.pumping = false;
        }
        self.pumping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tempo_steps_and_caps() {
        let tempo = Tempo::new();
        assert_eq!(tempo.bpm(), START_BPM);
        assert_eq!(tempo.increase(), 145);
        for _ in 0..50 {
            tempo.increase();
        }
        assert_eq!(tempo.bpm(), MAX_BPM);
        tempo.reset();
        assert_eq!(tempo.bpm(), START_BPM);
    }

    #[test]
    fn test_tempo_shared_between_clones() {
        let tempo = Tempo::new();
        let other = tempo.clone();
        other.increase();
        assert_eq!(tempo.bpm(), 145);
    }

    #[test]
    fn test_lookahead_window() {
        let mut seq = MusicSequencer::new(Tempo::new());
        assert!(seq.due_notes(0.0).is_empty(), "silent until started");

        assert!(seq.start(10.0));
        // 140 bpm: 16th notes every ~0.107 s, window is 0.1 s
        let notes = seq.due_notes(10.0);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].time, 10.0);
        assert!(notes[0].bass);
        assert_eq!(notes[0].freq, ARPEGGIO[0]);

        // Same clock again: nothing new
        assert!(seq.due_notes(10.0).is_empty());

        // One second later catches up on every note in between
        let notes = seq.due_notes(11.0);
        let interval = 60.0 / 140.0 * NOTE_LENGTH;
        assert!(notes.iter().all(|n| n.time < 11.0 + LOOKAHEAD));
        assert!(seq.next_note_time() >= 11.0 + LOOKAHEAD);
        assert!(seq.next_note_time() < 11.0 + LOOKAHEAD + interval);
    }

    #[test]
    fn test_sequence_cycles_with_bass_every_fourth() {
        let mut seq = MusicSequencer::new(Tempo::new());
        seq.start(0.0);
        let notes = seq.due_notes(5.0);
        assert!(notes.len() > ARPEGGIO.len());
        for note in &notes {
            assert_eq!(note.freq, ARPEGGIO[note.step % 16]);
            assert_eq!(note.bass, note.step % 4 == 0);
        }
    }

    #[test]
    fn test_faster_tempo_packs_more_notes() {
        let slow = Tempo::new();
        let fast = Tempo::new();
        for _ in 0..12 {
            fast.increase();
        }
        let mut a = MusicSequencer::new(slow);
        let mut b = MusicSequencer::new(fast);
        a.start(0.0);
        b.start(0.0);
        assert!(b.due_notes(4.0).len() > a.due_notes(4.0).len());
    }

    proptest! {
        #[test]
        fn prop_tempo_monotonic_and_capped(steps in 0usize..100) {
            let tempo = Tempo::new();
            let mut last = tempo.bpm();
            for _ in 0..steps {
                let bpm = tempo.increase();
                prop_assert!(bpm >= last);
                prop_assert!(bpm <= MAX_BPM);
                last = bpm;
            }
        }

        #[test]
        fn prop_notes_stay_in_window(start in 0.0f64..100.0, polls in proptest::collection::vec(0.0f64..0.5, 1..40)) {
            let mut seq = MusicSequencer::new(Tempo::new());
            seq.start(start);
            let mut now = start;
            let mut last_time = f64::NEG_INFINITY;
            for gap in polls {
                now += gap;
                for note in seq.due_notes(now) {
                    prop_assert!(note.time < now + LOOKAHEAD);
                    prop_assert!(note.time > last_time);
                    last_time = note.time;
                }
            }
        }
    }

    #[test]
    fn test_stop_and_pump_rearm() {
        let mut seq = MusicSequencer::new(Tempo::new());
        assert!(seq.start(0.0));
        assert!(!seq.start(0.0), "already playing");
        assert!(seq.keep_pumping());

        // Stop then restart before the pump noticed: old loop keeps going
        seq.stop();
        assert!(!seq.start(1.0));
        assert!(seq.keep_pumping());

        seq.stop();
        assert!(seq.due_notes(2.0).is_empty());
        assert!(!seq.keep_pumping());
        assert!(seq.start(3.0), "loop ended, a new one is needed");
    }
}
