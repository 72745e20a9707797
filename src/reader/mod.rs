//! The read-aloud core.
//!
//! [`ReadingController`] owns the loaded [`Document`] and runs at most one
//! background loop that feeds chunks to a speech engine. Pausing is
//! cooperative: the loop checks for a pending pause before each chunk and
//! while waiting between chunks, never in the middle of an utterance.

use thiserror::Error;

use crate::extract::ExtractionError;

pub mod controller;
pub mod gate;
pub mod selection;
pub mod state;

pub use controller::{Listener, Position, ReaderEvent, ReaderStatus, ReadingController};
pub use gate::{Action, Controls};
pub use selection::{resolve_offset, TextIndex};
pub use state::{Document, PlaybackState};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("no document loaded, open a PDF file first")]
    NoDocumentLoaded,
    #[error("nothing is selected in the text")]
    NoSelection,
    #[error("reading is already in progress")]
    AlreadyReading,
    #[error("could not extract text: {0}")]
    Extraction(#[from] ExtractionError),
}
