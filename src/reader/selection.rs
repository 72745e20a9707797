use once_cell::sync::Lazy;
use regex::Regex;

use super::ReaderError;

static INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\.(\d+)\s*$").expect("text index pattern compiles"));

/// A position in the text pane: 1-based line, 0-based character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextIndex {
    pub line: usize,
    pub column: usize,
}

impl TextIndex {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for TextIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

impl std::str::FromStr for TextIndex {
    type Err = &'static str;

    /// Parses `line.column`, e.g. `3.14`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let caps = INDEX_RE
            .captures(value)
            .ok_or("expected an index like 3.14 (line.column)")?;
        let line: usize = caps[1].parse().map_err(|_| "line number is too large")?;
        let column: usize = caps[2].parse().map_err(|_| "column number is too large")?;
        if line == 0 {
            return Err("line numbers start at 1");
        }
        Ok(Self { line, column })
    }
}

/// Number of characters before `index` in `text`.
///
/// Columns beyond a line's end stop at that line's end; lines beyond the
/// text stop at the end of the text.
pub fn resolve_offset(text: &str, index: Option<TextIndex>) -> Result<usize, ReaderError> {
    let index = index.ok_or(ReaderError::NoSelection)?;
    let mut offset = 0;
    for (number, line) in text.split('\n').enumerate() {
        let line_len = line.chars().count();
        if number + 1 == index.line {
            return Ok(offset + index.column.min(line_len));
        }
        offset += line_len + 1;
    }
    Ok(text.chars().count())
}
