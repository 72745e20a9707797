use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
    time::Instant,
};

use log::{debug, error, warn};

use super::{SpeechEngine, SpeechError};
use crate::audio::Playback;
use crate::util::piper_path::{command_to_args, PiperCommand};

/// Rate Piper speaks at with `--length_scale 1.0`.
pub const BASE_RATE_WPM: f32 = 150.0;

pub fn length_scale(rate: u32) -> f32 {
    BASE_RATE_WPM / rate.max(1) as f32
}

/// Synthesizes each chunk to a WAV file with Piper, then plays it.
pub struct PiperSpeech {
    command: PiperCommand,
    model_path: PathBuf,
    output_path: PathBuf,
    playback: Box<dyn Playback>,
}

impl PiperSpeech {
    pub fn new(
        command: PiperCommand,
        model_path: PathBuf,
        output_path: PathBuf,
        playback: Box<dyn Playback>,
    ) -> Self {
        Self {
            command,
            model_path,
            output_path,
            playback,
        }
    }

    fn build_command(&self, rate: u32) -> Result<Command, SpeechError> {
        if !self.model_path.exists() {
            return Err(SpeechError::VoiceNotFound(self.model_path.clone()));
        }

        if let Some(parent) = self
            .output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| {
                SpeechError::Other(format!(
                    "Unable to create output directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let (program, args) = command_to_args(&self.command);
        let mut command = Command::new(program);
        command.args(args);
        command.arg("--model");
        command.arg(&self.model_path);
        command.arg("--output_file");
        command.arg(&self.output_path);
        command.arg("--length_scale");
        command.arg(format!("{:.3}", length_scale(rate)));
        Ok(command)
    }

    fn synthesize(&self, text: &str, rate: u32) -> Result<(), SpeechError> {
        let start = Instant::now();
        let mut child = self
            .build_command(rate)?
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| SpeechError::Other("Failed to access Piper stdin".into()))?;
            stdin.write_all(text.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let status = output.status.code().unwrap_or_default();
            error!("Piper exited with status {status}: {stderr}");
            return Err(SpeechError::Process { status, stderr });
        }
        if !self.output_path.exists() {
            warn!(
                "Piper succeeded but {} was not created",
                self.output_path.display()
            );
            return Err(SpeechError::Other(format!(
                "Piper produced no audio at {}",
                self.output_path.display()
            )));
        }
        debug!(
            "Synthesized {} bytes of text in {} ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

impl SpeechEngine for PiperSpeech {
    fn speak(&self, text: &str, rate: u32) -> Result<(), SpeechError> {
        self.synthesize(text, rate)?;
        self.playback.play_to_end(&self.output_path)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "piper"
    }
}
