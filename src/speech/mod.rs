//! Speech engines.
//!
//! A [`SpeechEngine`] vocalizes one chunk at a time and does not return until
//! the chunk has been spoken. The reading loop relies on that to keep chunks
//! strictly ordered.

use std::path::PathBuf;

use thiserror::Error;

use crate::audio::AudioError;

pub mod command;
pub mod piper;
pub mod voices;

pub use command::CommandSpeech;
pub use piper::PiperSpeech;
pub use voices::VoiceLibrary;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("voice model not found at {0}")]
    VoiceNotFound(PathBuf),
    #[error("failed to spawn speech process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("speech process exited with status {status}: {stderr}")]
    Process { status: i32, stderr: String },
    #[error("playback failed: {0}")]
    Audio(#[from] AudioError),
    #[error("{0}")]
    Other(String),
}

pub trait SpeechEngine: Send + Sync {
    /// Speak `text` at `rate` words per minute, blocking until done.
    fn speak(&self, text: &str, rate: u32) -> Result<(), SpeechError>;

    fn name(&self) -> &str;
}
