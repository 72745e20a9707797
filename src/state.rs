use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    audio::RodioPlayback,
    extract::{PdfTextExtractor, ScriptExtractor, TextExtractor},
    reader::{Listener, ReadingController},
    settings::{settings_path, ExtractorKind, Settings, SpeechEngineKind},
    speech::{CommandSpeech, PiperSpeech, SpeechEngine, VoiceLibrary},
    util::{piper_path, runtime},
};

pub struct AppState {
    pub settings: Settings,
    pub controller: ReadingController,
}

impl AppState {
    pub fn initialise(listener: Listener) -> Result<Self> {
        let path = settings_path();
        let mut settings = Settings::load_or_default(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        settings.apply_env();

        let output_dir = runtime::output_dir();
        fs::create_dir_all(&output_dir).with_context(|| {
            format!("unable to create output directory {}", output_dir.display())
        })?;

        let extractor: Arc<dyn TextExtractor> = match settings.extractor {
            ExtractorKind::Native => Arc::new(PdfTextExtractor),
            ExtractorKind::Script => Arc::new(ScriptExtractor::from_env()),
        };
        let speech = build_speech(&settings, &output_dir)?;
        info!(
            "Speech engine {}, {} mode, punctuation {}",
            speech.name(),
            settings.resume_mode,
            if settings.normalize_punctuation() {
                "spoken"
            } else {
                "verbatim"
            }
        );

        let controller = ReadingController::new(
            extractor,
            speech,
            settings.resume_mode,
            settings.normalize_punctuation(),
        )
        .with_listener(listener);

        Ok(Self {
            settings,
            controller,
        })
    }
}

fn build_speech(settings: &Settings, output_dir: &Path) -> Result<Arc<dyn SpeechEngine>> {
    let command = || -> Result<Arc<dyn SpeechEngine>> {
        let speech = CommandSpeech::from_env_or(settings.speech_command.as_deref())
            .context("invalid speech command")?;
        Ok(Arc::new(speech))
    };

    match settings.speech_engine {
        SpeechEngineKind::Command => command(),
        SpeechEngineKind::Piper => Ok(Arc::new(piper_speech(settings, output_dir)?)),
        SpeechEngineKind::Auto => match piper_speech(settings, output_dir) {
            Ok(speech) => Ok(Arc::new(speech)),
            Err(err) => {
                warn!("Piper unavailable ({err:#}), falling back to the speech command");
                command()
            }
        },
    }
}

fn piper_speech(settings: &Settings, output_dir: &Path) -> Result<PiperSpeech> {
    let model = match &settings.piper_model {
        Some(model) => model.clone(),
        None => {
            let library = VoiceLibrary::scan(runtime::voices_dir());
            for voice in library.list() {
                debug!("Found voice {} at {}", voice.label, voice.model_path.display());
            }
            library
                .first()
                .map(|voice| voice.model_path.clone())
                .with_context(|| {
                    format!("no Piper voice found in {}", library.base_dir().display())
                })?
        }
    };
    let command = piper_path::resolve(&runtime::runtime_dir())?;
    info!("Using Piper voice {}", model.display());
    Ok(PiperSpeech::new(
        command,
        model,
        output_dir.join("chunk.wav"),
        Box::new(RodioPlayback),
    ))
}
