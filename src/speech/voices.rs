use std::{
    fs,
    path::{Path, PathBuf},
};

use log::warn;
use serde_json::Value;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: String,
    pub label: String,
    pub language: Option<String>,
    pub model_path: PathBuf,
}

/// Piper voices found under a directory, sorted by label.
#[derive(Debug, Default)]
pub struct VoiceLibrary {
    base_dir: PathBuf,
    voices: Vec<VoiceInfo>,
}

impl VoiceLibrary {
    pub fn scan(base_dir: PathBuf) -> Self {
        let mut voices = Vec::new();
        if base_dir.exists() {
            for entry in WalkDir::new(&base_dir)
                .into_iter()
                .filter_map(Result::ok)
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("onnx") {
                    continue;
                }
                if let Some(info) = build_voice_info(path) {
                    voices.push(info);
                }
            }
        }
        voices.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        Self { base_dir, voices }
    }

    pub fn list(&self) -> &[VoiceInfo] {
        &self.voices
    }

    pub fn first(&self) -> Option<&VoiceInfo> {
        self.voices.first()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn build_voice_info(path: &Path) -> Option<VoiceInfo> {
    let id = path.file_stem()?.to_string_lossy().to_string();
    // Piper ships `<voice>.onnx.json` next to each model.
    let mut metadata_path = path.as_os_str().to_owned();
    metadata_path.push(".json");
    let metadata_path = PathBuf::from(metadata_path);

    let metadata = if metadata_path.exists() {
        match fs::read_to_string(&metadata_path) {
            Ok(contents) => serde_json::from_str::<Value>(&contents)
                .map_err(|err| warn!("Failed to parse metadata {}: {err}", metadata_path.display()))
                .ok(),
            Err(err) => {
                warn!("Failed to read metadata {}: {err}", metadata_path.display());
                None
            }
        }
    } else {
        None
    };

    let language = metadata
        .as_ref()
        .and_then(|value| value.get("language"))
        .and_then(|lang| lang.get("name_english").or_else(|| lang.get("name")))
        .and_then(Value::as_str)
        .map(str::to_string);
    let label = language
        .as_ref()
        .map(|lang| format!("{lang} · {id}"))
        .unwrap_or_else(|| id.clone());

    Some(VoiceInfo {
        id,
        label,
        language,
        model_path: path.to_path_buf(),
    })
}
