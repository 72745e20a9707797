use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use log::{error, info};
use serde::Deserialize;

use super::{ensure_exists, ExtractionError, TextExtractor};

const DEFAULT_SCRIPT: &str = "scripts/py/pdf_extract.py";

#[derive(Debug, Deserialize)]
struct ScriptPage {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ScriptOutput {
    ok: bool,
    #[serde(default)]
    pages: Vec<ScriptPage>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extracts text by running an external helper that prints page text as JSON.
#[derive(Debug, Clone)]
pub struct ScriptExtractor {
    python: OsString,
    script: PathBuf,
}

impl ScriptExtractor {
    pub fn new(python: impl Into<OsString>, script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
        }
    }

    /// `READER_PYTHON_BIN` and `READER_PDF_SCRIPT`, falling back to the bundled helper.
    pub fn from_env() -> Self {
        let script = std::env::var_os("READER_PDF_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT));
        let python =
            std::env::var_os("READER_PYTHON_BIN").unwrap_or_else(|| OsString::from("python"));
        Self::new(python, script)
    }
}

impl TextExtractor for ScriptExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        ensure_exists(path)?;
        let output = Command::new(&self.python)
            .arg(&self.script)
            .arg(path)
            .output()
            .map_err(|err| {
                error!("Could not run {}: {err}", self.script.display());
                ExtractionError::Script(err.to_string())
            })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("pdf_extract failed: {message}");
            return Err(ExtractionError::Script(message));
        }

        let parsed: ScriptOutput =
            serde_json::from_slice(&output.stdout).map_err(|err| ExtractionError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        if !parsed.ok {
            return Err(ExtractionError::Parse {
                path: path.to_path_buf(),
                message: format!(
                    "{}: {}",
                    parsed.code.as_deref().unwrap_or("PDF_PARSE_FAIL"),
                    parsed.message.as_deref().unwrap_or("extraction failed")
                ),
            });
        }

        info!(
            "Helper extracted {} pages from {}",
            parsed.pages.len(),
            path.display()
        );
        Ok(parsed.pages.into_iter().map(|page| page.text).collect())
    }
}
