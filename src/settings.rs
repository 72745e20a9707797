use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RATE_RANGE: (u32, u32) = (100, 300);
pub const CHUNK_RANGE: (usize, usize) = (1, 10);
pub const PAUSE_MIN_MS: u64 = 100;
pub const PAUSE_MAX_MS: u64 = 2_000;
pub const PAUSE_MAX_MS_SELECTION: u64 = 10_000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse settings JSON {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// How `resume` picks up after a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    /// Continue at the first chunk that was not spoken yet.
    #[default]
    ContinueFromCursor,
    /// Read again from the selected start offset.
    RestartFromSelection,
}

impl ResumeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeMode::ContinueFromCursor => "continue_from_cursor",
            ResumeMode::RestartFromSelection => "restart_from_selection",
        }
    }

    pub fn max_pause_ms(&self) -> u64 {
        match self {
            ResumeMode::ContinueFromCursor => PAUSE_MAX_MS,
            ResumeMode::RestartFromSelection => PAUSE_MAX_MS_SELECTION,
        }
    }
}

impl std::fmt::Display for ResumeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResumeMode {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "continue" | "continue_from_cursor" | "cursor" => Ok(ResumeMode::ContinueFromCursor),
            "restart" | "restart_from_selection" | "selection" => {
                Ok(ResumeMode::RestartFromSelection)
            }
            _ => Err("unknown resume mode"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngineKind {
    #[default]
    Auto,
    Piper,
    Command,
}

impl std::str::FromStr for SpeechEngineKind {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SpeechEngineKind::Auto),
            "piper" => Ok(SpeechEngineKind::Piper),
            "command" => Ok(SpeechEngineKind::Command),
            _ => Err("unknown speech engine"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Native,
    Script,
}

/// Values read from the controls each time a reading session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// Words per minute handed to the speech engine.
    pub rate: u32,
    /// Words per utterance.
    pub chunk_size: usize,
    /// Silence between utterances.
    pub pause_ms: u64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            rate: 150,
            chunk_size: 5,
            pause_ms: 500,
        }
    }
}

impl ReadingConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Clamp every value to the range its control allows.
    pub fn clamped(mut self, mode: ResumeMode) -> Self {
        self.rate = self.rate.clamp(RATE_RANGE.0, RATE_RANGE.1);
        self.chunk_size = self.chunk_size.clamp(CHUNK_RANGE.0, CHUNK_RANGE.1);
        self.pause_ms = self.pause_ms.clamp(PAUSE_MIN_MS, mode.max_pause_ms());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub reading: ReadingConfig,
    pub resume_mode: ResumeMode,
    /// Unset means: on for selection restarts, off for cursor continuation.
    pub normalize_punctuation: Option<bool>,
    pub speech_engine: SpeechEngineKind,
    pub piper_model: Option<PathBuf>,
    pub speech_command: Option<String>,
    pub extractor: ExtractorKind,
}

impl Settings {
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data =
            fs::read_to_string(path).map_err(|err| SettingsError::Io(path.to_path_buf(), err))?;
        let mut settings: Settings = serde_json::from_str(&data)
            .map_err(|err| SettingsError::Parse(path.to_path_buf(), err))?;
        settings.normalize();
        Ok(settings)
    }

    /// Apply `READER_*` overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("READER_RESUME_MODE") {
            match value.parse() {
                Ok(mode) => self.resume_mode = mode,
                Err(err) => log::warn!("Ignoring READER_RESUME_MODE={value}: {err}"),
            }
        }
        if let Ok(value) = std::env::var("READER_SPEECH_ENGINE") {
            match value.parse() {
                Ok(kind) => self.speech_engine = kind,
                Err(err) => log::warn!("Ignoring READER_SPEECH_ENGINE={value}: {err}"),
            }
        }
        if let Some(model) = std::env::var_os("READER_PIPER_MODEL") {
            self.piper_model = Some(PathBuf::from(model));
        }
        self.normalize();
    }

    pub fn normalize(&mut self) {
        self.reading = self.reading.clamped(self.resume_mode);
        self.speech_command = self
            .speech_command
            .take()
            .map(|command| command.trim().to_string())
            .filter(|command| !command.is_empty());
    }

    pub fn normalize_punctuation(&self) -> bool {
        self.normalize_punctuation
            .unwrap_or(self.resume_mode == ResumeMode::RestartFromSelection)
    }
}

pub fn settings_path() -> PathBuf {
    std::env::var_os("READER_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| crate::util::runtime::runtime_dir().join("settings.json"))
}
