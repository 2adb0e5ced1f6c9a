//! Crate error type

use thiserror::Error;

/// Failures of the external collaborators (canvas, audio, storage)
#[derive(Debug, Error)]
pub enum Error {
    /// No canvas or 2D context; the game cannot run without one
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Audio context could not be created; the game runs silently
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// Key-value store write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Stored settings could not be decoded
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
