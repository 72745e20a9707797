//! Interactive terminal surface for the reading controller.
//!
//! Each line is one user action. Reading actions are checked against the
//! current [`Controls`] before they reach the controller, and every
//! recognised failure is printed as a warning instead of ending the session.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::info;

use crate::extract::is_pdf;
use crate::reader::{Action, Controls, ReaderEvent, ReadingController, TextIndex};
use crate::settings::{ReadingConfig, CHUNK_RANGE, PAUSE_MIN_MS, RATE_RANGE};

const DEFAULT_SHOW_LINES: usize = 40;

const HELP: &str = "\
commands:
  open <file.pdf>    load a PDF and extract its text
  start              read from the selection (or the beginning)
  pause              stop after the current chunk
  resume             continue a paused reading
  show [lines]       print the text with line numbers
  select <line.col>  start the next reading at this position
  select clear       start the next reading at the beginning
  rate <wpm>         reading speed in words per minute
  chunk <words>      words spoken per chunk
  gap <ms>           silence between chunks
  status             show the current state and controls
  help               show this list
  quit               stop reading and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Start,
    Pause,
    Resume,
    Show(usize),
    Select(Option<TextIndex>),
    ClearSelection,
    Rate(u32),
    Chunk(usize),
    Gap(u64),
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let number = |what: &str| -> Result<u64, String> {
        rest.parse::<u64>()
            .map_err(|_| format!("{what} needs a whole number, got '{rest}'"))
    };

    match word.to_ascii_lowercase().as_str() {
        "open" | "load" => {
            if rest.is_empty() {
                Err("open needs a file path".into())
            } else {
                Ok(Command::Open(PathBuf::from(rest)))
            }
        }
        "start" => Ok(Command::Start),
        "pause" => Ok(Command::Pause),
        "resume" => Ok(Command::Resume),
        "show" => {
            if rest.is_empty() {
                Ok(Command::Show(DEFAULT_SHOW_LINES))
            } else {
                number("show").map(|lines| Command::Show(lines as usize))
            }
        }
        "select" => {
            if rest.is_empty() {
                Ok(Command::Select(None))
            } else if rest.eq_ignore_ascii_case("clear") {
                Ok(Command::ClearSelection)
            } else {
                rest.parse::<TextIndex>()
                    .map(|index| Command::Select(Some(index)))
                    .map_err(str::to_string)
            }
        }
        "rate" => number("rate").map(|value| Command::Rate(value.min(u32::MAX as u64) as u32)),
        "chunk" => number("chunk").map(|value| Command::Chunk(value as usize)),
        "gap" => number("gap").map(Command::Gap),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

/// Prints loop progress; used as the controller's listener.
pub fn print_event(event: &ReaderEvent) {
    match event {
        ReaderEvent::ChunkSpoken { text, .. } => println!("  » {text}"),
        ReaderEvent::Paused { word } => println!("paused at word {word}"),
        ReaderEvent::Finished => println!("finished reading"),
        ReaderEvent::SpeechFailed { message, .. } => {
            println!("warning: speech failed: {message} (resume to retry)")
        }
    }
}

pub struct Console<'a, W: Write> {
    controller: &'a ReadingController,
    config: ReadingConfig,
    out: W,
}

impl<'a, W: Write> Console<'a, W> {
    pub fn new(controller: &'a ReadingController, config: ReadingConfig, out: W) -> Self {
        Self {
            controller,
            config: config.clamped(controller.mode()),
            out,
        }
    }

    pub fn config(&self) -> ReadingConfig {
        self.config
    }

    pub fn run(&mut self, input: impl BufRead) -> std::io::Result<()> {
        writeln!(self.out, "No PDF selected. Type 'help' for commands.")?;
        self.prompt()?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                self.prompt()?;
                continue;
            }
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command)?,
                Err(message) => writeln!(self.out, "warning: {message}")?,
            }
            self.prompt()?;
        }
        self.controller.shutdown();
        Ok(())
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        write!(self.out, "{}> ", render_controls(self.controller.controls()))?;
        self.out.flush()
    }

    pub fn execute(&mut self, command: Command) -> std::io::Result<()> {
        match command {
            Command::Open(path) => {
                if !is_pdf(&path) {
                    return writeln!(self.out, "warning: only PDF files can be opened");
                }
                match self.controller.load(&path) {
                    Ok(document) => writeln!(self.out, "Loaded: {}", document.name()),
                    Err(err) => writeln!(self.out, "warning: {err}"),
                }
            }
            Command::Start => {
                if !self.gate(Action::Start)? {
                    return Ok(());
                }
                match self.controller.start(self.config) {
                    Ok(()) => writeln!(self.out, "reading…"),
                    Err(err) => writeln!(self.out, "warning: {err}"),
                }
            }
            Command::Pause => {
                if !self.gate(Action::Pause)? {
                    return Ok(());
                }
                if self.controller.pause() {
                    writeln!(self.out, "pausing after the current chunk")
                } else {
                    writeln!(self.out, "already pausing")
                }
            }
            Command::Resume => {
                if !self.gate(Action::Resume)? {
                    return Ok(());
                }
                match self.controller.resume(self.config) {
                    Ok(true) => writeln!(self.out, "reading…"),
                    Ok(false) => writeln!(self.out, "nothing to resume"),
                    Err(err) => writeln!(self.out, "warning: {err}"),
                }
            }
            Command::Show(lines) => self.show(lines),
            Command::Select(index) => match self.controller.select(index) {
                Ok(offset) => writeln!(self.out, "next reading starts at character {offset}"),
                Err(err) => writeln!(self.out, "warning: {err}"),
            },
            Command::ClearSelection => {
                self.controller.clear_selection();
                writeln!(self.out, "next reading starts at the beginning")
            }
            Command::Rate(rate) => {
                self.config.rate = rate;
                self.apply_ranges();
                writeln!(
                    self.out,
                    "rate {} wpm (range {}-{})",
                    self.config.rate, RATE_RANGE.0, RATE_RANGE.1
                )
            }
            Command::Chunk(size) => {
                self.config.chunk_size = size;
                self.apply_ranges();
                writeln!(
                    self.out,
                    "{} words per chunk (range {}-{})",
                    self.config.chunk_size, CHUNK_RANGE.0, CHUNK_RANGE.1
                )
            }
            Command::Gap(ms) => {
                self.config.pause_ms = ms;
                self.apply_ranges();
                writeln!(
                    self.out,
                    "{} ms between chunks (range {}-{})",
                    self.config.pause_ms,
                    PAUSE_MIN_MS,
                    self.controller.mode().max_pause_ms()
                )
            }
            Command::Status => self.status(),
            Command::Help => writeln!(self.out, "{HELP}"),
            Command::Quit => Ok(()),
        }
    }

    fn gate(&mut self, action: Action) -> std::io::Result<bool> {
        let controls = self.controller.controls();
        if controls.allows(action) {
            return Ok(true);
        }
        info!(
            "Rejected {} while {}",
            action.as_str(),
            self.controller.state()
        );
        writeln!(
            self.out,
            "warning: {} is not available while {}",
            action.as_str(),
            self.controller.state()
        )?;
        Ok(false)
    }

    fn apply_ranges(&mut self) {
        self.config = self.config.clamped(self.controller.mode());
    }

    fn show(&mut self, lines: usize) -> std::io::Result<()> {
        let Some(document) = self.controller.document() else {
            return writeln!(self.out, "No PDF selected");
        };
        let total = document.text().split('\n').count();
        for (number, line) in document.text().split('\n').enumerate().take(lines) {
            writeln!(self.out, "{:>5} | {line}", number + 1)?;
        }
        if total > lines {
            writeln!(self.out, "      … {} more lines", total - lines)?;
        }
        Ok(())
    }

    fn status(&mut self) -> std::io::Result<()> {
        let status = self.controller.status();
        match &status.document {
            Some(name) => writeln!(self.out, "Loaded: {name}")?,
            None => writeln!(self.out, "No PDF selected")?,
        }
        if status.pause_pending {
            writeln!(self.out, "state: {} (pause requested)", status.state)?;
        } else {
            writeln!(self.out, "state: {}", status.state)?;
        }
        if let Some(offset) = status.selection {
            writeln!(self.out, "selection: character {offset}")?;
        }
        if status.total_words > 0 {
            writeln!(
                self.out,
                "position: word {}/{} from character {}",
                status.position.word, status.total_words, status.position.start_offset
            )?;
        }
        writeln!(
            self.out,
            "rate {} wpm, {} words per chunk, {} ms gap, {} mode{}",
            self.config.rate,
            self.config.chunk_size,
            self.config.pause_ms,
            self.controller.mode(),
            if self.controller.normalizes_punctuation() {
                ", punctuation spoken"
            } else {
                ""
            }
        )?;
        writeln!(self.out, "controls: {}", render_controls(self.controller.controls()))
    }
}

/// `[start] (pause) (resume)`: brackets mark enabled actions.
pub fn render_controls(controls: Controls) -> String {
    [Action::Start, Action::Pause, Action::Resume]
        .iter()
        .map(|action| {
            if controls.allows(*action) {
                format!("[{}]", action.as_str())
            } else {
                format!("({})", action.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
