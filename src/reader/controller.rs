use std::{
    path::Path,
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{resolve_offset, Controls, Document, PlaybackState, ReaderError, TextIndex};
use crate::extract::TextExtractor;
use crate::settings::{ReadingConfig, ResumeMode};
use crate::speech::SpeechEngine;
use crate::text::{normalize, split_words, Chunker};

/// Progress notifications published from the reading loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    ChunkSpoken { word: usize, text: String },
    Paused { word: usize },
    Finished,
    SpeechFailed { word: usize, message: String },
}

pub type Listener = Arc<dyn Fn(&ReaderEvent) + Send + Sync>;

/// Where reading stands: the character offset the run started from and the
/// next unread word of that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub start_offset: usize,
    pub word: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderStatus {
    pub state: PlaybackState,
    pub document: Option<String>,
    pub selection: Option<usize>,
    pub position: Position,
    pub total_words: usize,
    pub pause_pending: bool,
}

struct Run {
    words: Arc<[String]>,
    start_offset: usize,
}

#[derive(Default)]
struct Inner {
    document: Option<Document>,
    state: PlaybackState,
    selection: Option<usize>,
    run: Option<Run>,
    cursor: usize,
    pause_requested: bool,
    /// Bumped for every launched loop and every load; a loop that sees a
    /// different value has been superseded and must not touch state.
    generation: u64,
}

#[derive(Default)]
struct Shared {
    inner: Mutex<Inner>,
    changed: Condvar,
}

pub struct ReadingController {
    shared: Arc<Shared>,
    extractor: Arc<dyn TextExtractor>,
    speech: Arc<dyn SpeechEngine>,
    mode: ResumeMode,
    normalize: bool,
    listener: Option<Listener>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReadingController {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        speech: Arc<dyn SpeechEngine>,
        mode: ResumeMode,
        normalize: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            extractor,
            speech,
            mode,
            normalize,
            listener: None,
            worker: Mutex::new(None),
        }
    }

    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn mode(&self) -> ResumeMode {
        self.mode
    }

    pub fn normalizes_punctuation(&self) -> bool {
        self.normalize
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().state
    }

    pub fn controls(&self) -> Controls {
        Controls::for_state(self.state())
    }

    pub fn document(&self) -> Option<Document> {
        self.shared.inner.lock().document.clone()
    }

    pub fn status(&self) -> ReaderStatus {
        let inner = self.shared.inner.lock();
        ReaderStatus {
            state: inner.state,
            document: inner.document.as_ref().map(Document::name),
            selection: inner.selection,
            position: Position {
                start_offset: inner.run.as_ref().map_or(0, |run| run.start_offset),
                word: inner.cursor,
            },
            total_words: inner.run.as_ref().map_or(0, |run| run.words.len()),
            pause_pending: inner.pause_requested,
        }
    }

    /// Extract `path` and make it the current document.
    ///
    /// On failure nothing changes. On success any previous document,
    /// selection and position are discarded and the controller is idle; a
    /// loop still speaking the old document stops after its current chunk.
    pub fn load(&self, path: &Path) -> Result<Document, ReaderError> {
        let text = self.extractor.extract(path).map_err(|err| {
            warn!("Failed to load {}: {err}", path.display());
            err
        })?;
        let document = Document::new(path, text);
        info!(
            "Loaded {} ({} characters)",
            path.display(),
            document.char_count()
        );

        let mut inner = self.shared.inner.lock();
        if inner.state == PlaybackState::Reading {
            debug!("Superseding the running loop");
        }
        inner.generation += 1;
        inner.document = Some(document.clone());
        inner.state = PlaybackState::Idle;
        inner.selection = None;
        inner.run = None;
        inner.cursor = 0;
        inner.pause_requested = false;
        drop(inner);
        self.shared.changed.notify_all();
        Ok(document)
    }

    /// Resolve a text-pane index and use it as the start of the next run.
    pub fn select(&self, index: Option<TextIndex>) -> Result<usize, ReaderError> {
        let mut inner = self.shared.inner.lock();
        let document = inner.document.as_ref().ok_or(ReaderError::NoDocumentLoaded)?;
        let offset = resolve_offset(document.text(), index)?;
        inner.selection = Some(offset);
        info!("Reading will start at character {offset}");
        Ok(offset)
    }

    pub fn clear_selection(&self) {
        self.shared.inner.lock().selection = None;
    }

    /// Begin a fresh run from the selection (or the start of the text).
    pub fn start(&self, config: ReadingConfig) -> Result<(), ReaderError> {
        let mut inner = self.shared.inner.lock();
        let document = inner.document.as_ref().ok_or(ReaderError::NoDocumentLoaded)?;
        if inner.state == PlaybackState::Reading {
            return Err(ReaderError::AlreadyReading);
        }

        let start_offset = inner.selection.unwrap_or(0);
        let words = self.prepare_words(document, start_offset);
        info!(
            "Starting at character {start_offset}: {} words, rate {}, chunk {}, pause {} ms",
            words.len(),
            config.rate,
            config.chunk_size,
            config.pause_ms
        );
        inner.run = Some(Run {
            words,
            start_offset,
        });
        inner.cursor = 0;
        self.launch(inner, config);
        Ok(())
    }

    /// Ask the running loop to stop before its next chunk.
    ///
    /// Returns `false` when there is nothing to pause. The state becomes
    /// [`PlaybackState::Paused`] once the loop has actually stopped.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.state != PlaybackState::Reading || inner.pause_requested {
            return false;
        }
        inner.pause_requested = true;
        drop(inner);
        self.shared.changed.notify_all();
        debug!("Pause requested");
        true
    }

    /// Continue a paused run, or withdraw a pause that has not taken effect yet.
    ///
    /// Returns `Ok(false)` when there is nothing to resume.
    pub fn resume(&self, config: ReadingConfig) -> Result<bool, ReaderError> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            PlaybackState::Idle => return Ok(false),
            PlaybackState::Reading => {
                let withdrawn = std::mem::take(&mut inner.pause_requested);
                drop(inner);
                if withdrawn {
                    self.shared.changed.notify_all();
                    debug!("Pending pause withdrawn");
                }
                return Ok(withdrawn);
            }
            PlaybackState::Paused => {}
        }
        if inner.run.is_none() {
            return Ok(false);
        }
        if self.mode == ResumeMode::RestartFromSelection {
            inner.cursor = 0;
        }
        info!(
            "Resuming at word {} ({}), rate {}, chunk {}, pause {} ms",
            inner.cursor, self.mode, config.rate, config.chunk_size, config.pause_ms
        );
        self.launch(inner, config);
        Ok(true)
    }

    /// Block while a loop is reading, up to `timeout`. Returns the state seen last.
    pub fn wait_while_reading(&self, timeout: Duration) -> PlaybackState {
        let deadline = Instant::now() + timeout;
        let mut inner = self.shared.inner.lock();
        while inner.state == PlaybackState::Reading {
            if self
                .shared
                .changed
                .wait_until(&mut inner, deadline)
                .timed_out()
            {
                break;
            }
        }
        inner.state
    }

    /// Stop any loop and wait for it to finish its current chunk.
    pub fn shutdown(&self) {
        {
            let mut inner = self.shared.inner.lock();
            inner.generation += 1;
            if inner.state == PlaybackState::Reading {
                inner.state = PlaybackState::Paused;
            }
        }
        self.shared.changed.notify_all();
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Reading loop panicked");
            }
        }
    }

    fn prepare_words(&self, document: &Document, start_offset: usize) -> Arc<[String]> {
        let tail = document.tail_from(start_offset);
        let words = if self.normalize {
            split_words(&normalize(tail))
        } else {
            split_words(tail)
        };
        words.into()
    }

    /// Mark the run as reading and spawn its loop. Consumes the guard so the
    /// previous worker is joined without holding the state lock.
    fn launch(&self, mut inner: MutexGuard<'_, Inner>, config: ReadingConfig) {
        inner.state = PlaybackState::Reading;
        inner.pause_requested = false;
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);
        self.shared.changed.notify_all();

        let mut worker = self.worker.lock();
        if let Some(previous) = worker.take() {
            if previous.join().is_err() {
                error!("Previous reading loop panicked");
            }
        }
        let reading_loop = ReadingLoop {
            shared: Arc::clone(&self.shared),
            speech: Arc::clone(&self.speech),
            listener: self.listener.clone(),
            generation,
            config,
        };
        let spawned = thread::Builder::new()
            .name("read-aloud".into())
            .spawn(move || reading_loop.run());
        match spawned {
            Ok(handle) => *worker = Some(handle),
            Err(err) => {
                error!("Could not start the reading thread: {err}");
                let mut inner = self.shared.inner.lock();
                if inner.generation == generation {
                    inner.state = PlaybackState::Paused;
                }
                drop(inner);
                self.shared.changed.notify_all();
            }
        }
    }
}

/// Everything the background thread needs for one run.
struct ReadingLoop {
    shared: Arc<Shared>,
    speech: Arc<dyn SpeechEngine>,
    listener: Option<Listener>,
    generation: u64,
    config: ReadingConfig,
}

impl ReadingLoop {
    fn run(self) {
        let (words, start) = {
            let inner = self.shared.inner.lock();
            match (&inner.run, inner.generation == self.generation) {
                (Some(run), true) => (Arc::clone(&run.words), inner.cursor),
                _ => return,
            }
        };
        let mut chunks = Chunker::new(&words, start, self.config.chunk_size);

        loop {
            let word = chunks.cursor();
            let pause_requested = {
                let inner = self.shared.inner.lock();
                if inner.generation != self.generation {
                    return;
                }
                inner.pause_requested
            };
            // Running out of words wins over a pending pause.
            if word >= words.len() {
                break;
            }
            if pause_requested {
                info!("Paused at word {word}");
                self.settle(PlaybackState::Paused, word, ReaderEvent::Paused { word });
                return;
            }
            let Some(chunk) = chunks.next() else {
                break;
            };

            debug!("Speaking words {word}..{}: {chunk}", chunks.cursor());
            if let Err(err) = self.speech.speak(&chunk, self.config.rate) {
                error!("Speech engine {} failed: {err}", self.speech.name());
                self.settle(
                    PlaybackState::Paused,
                    word,
                    ReaderEvent::SpeechFailed {
                        word,
                        message: err.to_string(),
                    },
                );
                return;
            }

            {
                let mut inner = self.shared.inner.lock();
                if inner.generation != self.generation {
                    return;
                }
                inner.cursor = chunks.cursor().min(words.len());
            }
            self.emit(ReaderEvent::ChunkSpoken { word, text: chunk });

            if !self.wait_between_chunks() {
                return;
            }
        }

        info!("Finished reading");
        self.settle(PlaybackState::Idle, words.len(), ReaderEvent::Finished);
    }

    /// End the run in `state` with the cursor at `word`.
    ///
    /// The event goes out before waiters are released, so anyone woken by
    /// the state change has already seen it. A superseded run does neither.
    fn settle(&self, state: PlaybackState, word: usize, event: ReaderEvent) {
        if self.shared.inner.lock().generation != self.generation {
            return;
        }
        self.emit(event);
        let mut inner = self.shared.inner.lock();
        if inner.generation != self.generation {
            return;
        }
        inner.pause_requested = false;
        inner.cursor = word;
        inner.state = state;
        drop(inner);
        self.shared.changed.notify_all();
    }

    /// Sleep for the configured pause, waking early for a pause request.
    /// Returns `false` once the run has been superseded.
    fn wait_between_chunks(&self) -> bool {
        let deadline = Instant::now() + self.config.pause();
        let mut inner = self.shared.inner.lock();
        loop {
            if inner.generation != self.generation {
                return false;
            }
            if inner.pause_requested {
                return true;
            }
            if self
                .shared
                .changed
                .wait_until(&mut inner, deadline)
                .timed_out()
            {
                return inner.generation == self.generation;
            }
        }
    }

    fn emit(&self, event: ReaderEvent) {
        if let Some(listener) = &self.listener {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionError;
    use crate::speech::SpeechError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::mpsc::{channel, Receiver, Sender};

    const WAIT: Duration = Duration::from_secs(5);

    struct MemoryExtractor {
        files: HashMap<PathBuf, String>,
    }

    impl MemoryExtractor {
        fn new(files: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                files: files
                    .iter()
                    .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                    .collect(),
            })
        }
    }

    impl TextExtractor for MemoryExtractor {
        fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| ExtractionError::NotFound(path.to_path_buf()))
        }
    }

    /// Records chunks; optionally parks on the first chunk until released.
    #[derive(Default)]
    struct ScriptedSpeech {
        spoken: Mutex<Vec<(String, u32)>>,
        hold_first: Mutex<Option<(Sender<String>, Receiver<()>)>>,
        fail_on: Option<String>,
    }

    impl ScriptedSpeech {
        fn holding() -> (Arc<Self>, Receiver<String>, Sender<()>) {
            let (spoken_tx, spoken_rx) = channel();
            let (release_tx, release_rx) = channel();
            let speech = Arc::new(Self {
                hold_first: Mutex::new(Some((spoken_tx, release_rx))),
                ..Self::default()
            });
            (speech, spoken_rx, release_tx)
        }

        fn texts(&self) -> Vec<String> {
            self.spoken.lock().iter().map(|(text, _)| text.clone()).collect()
        }
    }

    impl SpeechEngine for ScriptedSpeech {
        fn speak(&self, text: &str, rate: u32) -> Result<(), SpeechError> {
            if self.fail_on.as_deref() == Some(text) {
                return Err(SpeechError::Other("engine went away".into()));
            }
            self.spoken.lock().push((text.to_string(), rate));
            let hold = self.hold_first.lock().take();
            if let Some((spoken, release)) = hold {
                spoken.send(text.to_string()).unwrap();
                release.recv().unwrap();
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn config(chunk_size: usize) -> ReadingConfig {
        ReadingConfig {
            rate: 180,
            chunk_size,
            pause_ms: 0,
        }
    }

    fn controller(
        files: &[(&str, &str)],
        speech: Arc<ScriptedSpeech>,
        mode: ResumeMode,
        normalize: bool,
    ) -> ReadingController {
        ReadingController::new(MemoryExtractor::new(files), speech, mode, normalize)
    }

    #[test]
    fn start_without_document_is_rejected() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(&[], speech.clone(), ResumeMode::ContinueFromCursor, false);
        assert!(matches!(
            reader.start(config(5)),
            Err(ReaderError::NoDocumentLoaded)
        ));
        assert_eq!(reader.state(), PlaybackState::Idle);
        assert!(speech.texts().is_empty());
    }

    #[test]
    fn reads_normalized_text_to_the_end() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "Hello, world. Goodbye!")],
            speech.clone(),
            ResumeMode::RestartFromSelection,
            true,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(2)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(
            speech.texts(),
            vec!["Hello comma", "world full", "stop Goodbye", "exclamation mark"]
        );
        assert!(speech.spoken.lock().iter().all(|(_, rate)| *rate == 180));
        assert!(reader.controls().start);
    }

    #[test]
    fn cursor_mode_reads_punctuation_verbatim() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "Hello, world.")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(5)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["Hello, world."]);
    }

    #[test]
    fn start_reaches_reading_and_blocks_second_start() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "one two three")],
            speech,
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(1)).unwrap();
        assert_eq!(reader.state(), PlaybackState::Reading);
        assert_eq!(spoken.recv_timeout(WAIT).unwrap(), "one");
        assert!(matches!(
            reader.start(config(1)),
            Err(ReaderError::AlreadyReading)
        ));
        assert_eq!(
            reader.controls(),
            Controls::for_state(PlaybackState::Reading)
        );
        release.send(()).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
    }

    #[test]
    fn pause_and_resume_outside_their_states_are_no_ops() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "text")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        assert!(!reader.pause());
        assert!(!reader.resume(config(5)).unwrap());
        reader.load(Path::new("a.pdf")).unwrap();
        assert!(!reader.pause());
        assert!(!reader.resume(config(5)).unwrap());
        assert_eq!(reader.state(), PlaybackState::Idle);
        assert!(speech.texts().is_empty());
    }

    #[test]
    fn cursor_mode_resumes_after_the_spoken_chunk() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "a b c d e")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(2)).unwrap();
        assert_eq!(spoken.recv_timeout(WAIT).unwrap(), "a b");

        assert!(reader.pause());
        // Controls follow the loop, not the request.
        assert_eq!(reader.state(), PlaybackState::Reading);
        assert!(reader.status().pause_pending);
        release.send(()).unwrap();

        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Paused);
        assert_eq!(reader.status().position.word, 2);
        assert_eq!(
            reader.controls(),
            Controls {
                start: true,
                pause: false,
                resume: true
            }
        );

        assert!(reader.resume(config(2)).unwrap());
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["a b", "c d", "e"]);
    }

    #[test]
    fn selection_mode_restarts_from_the_selection() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "zero one\ntwo three four five")],
            speech.clone(),
            ResumeMode::RestartFromSelection,
            true,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        assert_eq!(reader.select(Some(TextIndex::new(2, 0))).unwrap(), 9);
        reader.start(config(2)).unwrap();
        assert_eq!(spoken.recv_timeout(WAIT).unwrap(), "two three");
        assert!(reader.pause());
        release.send(()).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Paused);

        assert!(reader.resume(config(2)).unwrap());
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["two three", "two three", "four five"]);
        assert_eq!(reader.status().position.start_offset, 9);
    }

    #[test]
    fn resume_while_pause_pending_withdraws_it() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "a b c")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(1)).unwrap();
        spoken.recv_timeout(WAIT).unwrap();
        assert!(reader.pause());
        assert!(!reader.pause());
        assert!(reader.resume(config(1)).unwrap());
        release.send(()).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn select_without_position_changes_nothing() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "some text")],
            speech,
            ResumeMode::RestartFromSelection,
            true,
        );
        assert!(matches!(
            reader.select(Some(TextIndex::new(1, 0))),
            Err(ReaderError::NoDocumentLoaded)
        ));
        reader.load(Path::new("a.pdf")).unwrap();
        reader.select(Some(TextIndex::new(1, 5))).unwrap();
        assert!(matches!(reader.select(None), Err(ReaderError::NoSelection)));
        assert_eq!(reader.status().selection, Some(5));
        assert_eq!(reader.state(), PlaybackState::Idle);
    }

    #[test]
    fn second_load_replaces_the_document() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("first.pdf", "alpha beta"), ("second.pdf", "gamma")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("first.pdf")).unwrap();
        reader.select(Some(TextIndex::new(1, 6))).unwrap();
        let doc = reader.load(Path::new("second.pdf")).unwrap();
        assert_eq!(doc.text(), "gamma");
        assert_eq!(reader.status().selection, None);

        reader.start(config(5)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["gamma"]);
    }

    #[test]
    fn failed_load_keeps_the_previous_document() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "kept")],
            speech,
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        let err = reader.load(Path::new("missing.pdf")).unwrap_err();
        assert!(matches!(err, ReaderError::Extraction(_)));
        assert_eq!(reader.document().unwrap().text(), "kept");
    }

    #[test]
    fn load_while_reading_supersedes_the_loop() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "old words here"), ("b.pdf", "new")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(1)).unwrap();
        spoken.recv_timeout(WAIT).unwrap();
        reader.load(Path::new("b.pdf")).unwrap();
        assert_eq!(reader.state(), PlaybackState::Idle);
        release.send(()).unwrap();

        reader.start(config(1)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["old", "new"]);
    }

    #[test]
    fn pause_during_the_last_chunk_still_finishes() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reader = controller(
            &[("a.pdf", "only words")],
            speech.clone(),
            ResumeMode::RestartFromSelection,
            false,
        )
        .with_listener(Arc::new(move |event: &ReaderEvent| {
            sink.lock().push(event.clone())
        }));
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(5)).unwrap();
        assert_eq!(spoken.recv_timeout(WAIT).unwrap(), "only words");
        assert!(reader.pause());
        release.send(()).unwrap();

        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        let status = reader.status();
        assert_eq!(status.position.word, 2);
        assert_eq!(status.total_words, 2);
        assert!(!status.pause_pending);
        assert_eq!(events.lock().last(), Some(&ReaderEvent::Finished));

        assert!(!reader.resume(config(5)).unwrap());
        assert_eq!(speech.texts(), vec!["only words"]);
    }

    #[test]
    fn speech_failure_pauses_at_the_failed_chunk() {
        let speech = Arc::new(ScriptedSpeech {
            fail_on: Some("c d".into()),
            ..ScriptedSpeech::default()
        });
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let reader = controller(
            &[("a.pdf", "a b c d")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        )
        .with_listener(Arc::new(move |event: &ReaderEvent| {
            sink.lock().push(event.clone())
        }));
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(2)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Paused);
        assert_eq!(reader.status().position.word, 2);
        assert_eq!(
            events.lock().as_slice(),
            [
                ReaderEvent::ChunkSpoken {
                    word: 0,
                    text: "a b".into()
                },
                ReaderEvent::SpeechFailed {
                    word: 2,
                    message: "engine went away".into()
                },
            ]
        );
    }

    #[test]
    fn pause_interrupts_the_gap_between_chunks() {
        let speech = Arc::new(ScriptedSpeech::default());
        let reader = controller(
            &[("a.pdf", "a b")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        let started = Instant::now();
        reader
            .start(ReadingConfig {
                rate: 150,
                chunk_size: 1,
                pause_ms: 60_000,
            })
            .unwrap();
        while speech.texts().is_empty() {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(reader.pause());
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Paused);
        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(speech.texts(), vec!["a"]);
        assert_eq!(reader.status().position.word, 1);
    }

    #[test]
    fn start_from_paused_begins_a_fresh_run() {
        let (speech, spoken, release) = ScriptedSpeech::holding();
        let reader = controller(
            &[("a.pdf", "a b c")],
            speech.clone(),
            ResumeMode::ContinueFromCursor,
            false,
        );
        reader.load(Path::new("a.pdf")).unwrap();
        reader.start(config(1)).unwrap();
        spoken.recv_timeout(WAIT).unwrap();
        reader.pause();
        release.send(()).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Paused);

        reader.start(config(3)).unwrap();
        assert_eq!(reader.wait_while_reading(WAIT), PlaybackState::Idle);
        assert_eq!(speech.texts(), vec!["a", "a b c"]);
    }
}
