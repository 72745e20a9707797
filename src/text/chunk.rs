/// Split text on any run of whitespace.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Lazily groups words into utterances of at most `size` words.
///
/// The cursor always moves by exactly `size`, so the last chunk may be
/// shorter and the iterator ends once the cursor passes the final word.
/// Building a new chunker with the same inputs yields the same chunks.
#[derive(Debug, Clone)]
pub struct Chunker<'a> {
    words: &'a [String],
    cursor: usize,
    size: usize,
}

impl<'a> Chunker<'a> {
    pub fn new(words: &'a [String], start: usize, size: usize) -> Self {
        Self {
            words,
            cursor: start,
            size: size.max(1),
        }
    }

    /// Word index of the next chunk boundary.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Iterator for Chunker<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.words.len() {
            return None;
        }
        let end = (self.cursor + self.size).min(self.words.len());
        let chunk = self.words[self.cursor..end].join(" ");
        self.cursor += self.size;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.words.len().saturating_sub(self.cursor);
        let chunks = remaining.div_ceil(self.size);
        (chunks, Some(chunks))
    }
}
