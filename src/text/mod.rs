//! Text preparation for the speech engine.
//!
//! [`normalize`] turns punctuation into words the engine will pronounce and
//! [`Chunker`] groups the resulting words into fixed-size utterances.

pub mod chunk;
pub mod normalize;

pub use chunk::{split_words, Chunker};
pub use normalize::normalize;
