//! Document text extraction.
//!
//! Every extractor returns the text of all pages concatenated in page order
//! with nothing inserted between pages. Failures of any kind, including
//! panics raised inside a PDF parser, surface as [`ExtractionError`].

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod native;
pub mod script;

pub use native::PdfTextExtractor;
pub use script::ScriptExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("extraction helper failed: {0}")]
    Script(String),
    #[error("extractor crashed while reading {0}")]
    Panicked(PathBuf),
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn ensure_exists(path: &Path) -> Result<(), ExtractionError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ExtractionError::NotFound(path.to_path_buf()))
    }
}
