use std::{
    io::Write,
    process::{Command, Stdio},
};

use log::{debug, error};

use super::{SpeechEngine, SpeechError};

pub const DEFAULT_SPEECH_COMMAND: &str = "espeak-ng -s {rate} --stdin";

/// Speaks through an external program that plays audio itself.
///
/// `{rate}` in any argument becomes the words-per-minute value. When an
/// argument contains `{text}` the chunk is substituted there, otherwise it is
/// written to the program's stdin.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    pub fn parse(template: &str) -> Result<Self, SpeechError> {
        let mut parts = shlex::Shlex::new(template);
        let program = parts
            .next()
            .ok_or_else(|| SpeechError::Other("speech command is empty".into()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// `READER_SPEECH_COMMAND`, then the configured template, then espeak-ng.
    pub fn from_env_or(template: Option<&str>) -> Result<Self, SpeechError> {
        match std::env::var("READER_SPEECH_COMMAND") {
            Ok(raw) if !raw.trim().is_empty() => Self::parse(&raw),
            _ => Self::parse(template.unwrap_or(DEFAULT_SPEECH_COMMAND)),
        }
    }

    fn uses_text_placeholder(&self) -> bool {
        self.args.iter().any(|arg| arg.contains("{text}"))
    }

    fn expand_args(&self, text: &str, rate: u32) -> Vec<String> {
        let rate = rate.to_string();
        self.args
            .iter()
            .map(|arg| arg.replace("{rate}", &rate).replace("{text}", text))
            .collect()
    }
}

impl SpeechEngine for CommandSpeech {
    fn speak(&self, text: &str, rate: u32) -> Result<(), SpeechError> {
        let args = self.expand_args(text, rate);
        debug!("Running {} {:?}", self.program, args);
        let via_stdin = !self.uses_text_placeholder();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(if via_stdin { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        if via_stdin {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let status = output.status.code().unwrap_or_default();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("{} exited with status {status}: {stderr}", self.program);
            return Err(SpeechError::Process { status, stderr });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
