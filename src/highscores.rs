//! Best score tracking
//!
//! A single integer persisted in the key-value store.

use crate::platform::KeyValueStore;

/// Best score across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neonAscentHighScore";

    /// Load from the store (0 when absent or unreadable)
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(Self::STORAGE_KEY) else {
            log::info!("No high score found, starting fresh");
            return Self::default();
        };

        match raw.trim().parse::<u64>() {
            Ok(best) => {
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Err(_) => {
                log::warn!("Ignoring unreadable high score {:?}", raw);
                Self::default()
            }
        }
    }

    /// Whether a score beats the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished run's score, saving it if it is a new best.
    /// Returns true for a new best.
    pub fn record(&mut self, score: u64, store: &mut dyn KeyValueStore) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        match store.set(Self::STORAGE_KEY, &score.to_string()) {
            Ok(()) => log::info!("High score saved ({})", score),
            Err(e) => log::warn!("Failed to save high score: {}", e),
        }
        true
    }
}
