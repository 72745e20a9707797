use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("could not open audio file: {0}")]
    Io(String),
    #[error("audio file is corrupt: {0}")]
    Decode(String),
    #[error("no playback device available")]
    Device,
}

pub trait Playback: Send + Sync {
    /// Play `path` and return once it has finished.
    fn play_to_end(&self, path: &Path) -> Result<(), AudioError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RodioPlayback;

impl Playback for RodioPlayback {
    fn play_to_end(&self, path: &Path) -> Result<(), AudioError> {
        let file = File::open(path).map_err(|err| AudioError::Io(err.to_string()))?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|err| AudioError::Decode(err.to_string()))?;

        // The stream must outlive the sink or playback stops immediately.
        let (_stream, handle) = OutputStream::try_default().map_err(|_| AudioError::Device)?;
        let sink = Sink::try_new(&handle).map_err(|err| AudioError::Io(err.to_string()))?;
        sink.append(decoder);
        sink.sleep_until_end();
        Ok(())
    }
}
