//! Error types for voxcall-spk

use thiserror::Error;

/// Speech synthesis errors
#[derive(Error, Debug)]
pub enum SpeechError {
    /// The speech endpoint answered with a non-success status.
    /// Displays as the server-supplied message only.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio response too large ({size} bytes, max {max} bytes)")]
    AudioTooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    /// HTTP status reported by the speech endpoint, if this error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            SpeechError::Api { status, .. } => Some(*status),
            SpeechError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
