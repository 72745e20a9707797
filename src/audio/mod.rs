//! Audio playback for synthesized speech.
//!
//! [`Playback`] is the seam between speech engines and the output device.
//! [`RodioPlayback`] plays WAV files through the default device and blocks
//! until the file has been heard; tests substitute a recording backend.

pub mod player;

pub use player::{AudioError, Playback, RodioPlayback};
