use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    path::Path,
};

use log::{debug, info};
use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use pdf::font::ToUnicodeMap;
use pdf::object::{Resolve, Resources};
use pdf::primitive::{Name, PdfString};

use super::{ensure_exists, ExtractionError, TextExtractor};

/// A `TJ` adjustment at or below this value reads as a word gap.
const TJ_INSERT_SPACE_THRESHOLD: f32 = -200.0;

/// Extracts text in-process by walking each page's text operators.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        ensure_exists(path)?;
        match panic::catch_unwind(AssertUnwindSafe(|| extract_pages(path))) {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Panicked(path.to_path_buf())),
        }
    }
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn extract_pages(path: &Path) -> Result<String, ExtractionError> {
    let file = FileOptions::cached()
        .open(path)
        .map_err(|err| parse_error(path, err))?;
    let resolver = file.resolver();
    let mut text = String::new();

    for page_index in 0..file.num_pages() {
        let page = file
            .get_page(page_index)
            .map_err(|err| parse_error(path, err))?;
        let Some(content) = &page.contents else {
            debug!("Page {page_index} of {} has no content", path.display());
            continue;
        };
        let resources = page.resources().map_err(|err| parse_error(path, err))?;
        let ops = content
            .operations(&resolver)
            .map_err(|err| parse_error(path, err))?;
        append_page(&mut text, &ops, &resolver, resources);
    }

    info!(
        "Extracted {} characters from {} pages of {}",
        text.chars().count(),
        file.num_pages(),
        path.display()
    );
    Ok(text)
}

/// Pages run straight into each other; no separator is added between them.
fn append_page(text: &mut String, ops: &[Op], resolver: &impl Resolve, resources: &Resources) {
    text.push_str(&ops_to_text(ops, resolver, resources));
}

fn ops_to_text(ops: &[Op], resolver: &impl Resolve, resources: &Resources) -> String {
    let mut tounicode_cache: HashMap<Name, Option<ToUnicodeMap>> = HashMap::new();
    let mut current_font: Option<Name> = None;
    let mut pending_space = false;
    let mut out = String::new();

    for op in ops {
        match op {
            Op::TextFont { name, .. } => {
                current_font = Some(name.clone());
            }
            Op::TextDraw { text } => {
                let piece = decode_pdf_string(
                    text,
                    current_font.as_ref(),
                    resolver,
                    resources,
                    &mut tounicode_cache,
                );
                append_text_piece(&mut out, &piece, &mut pending_space);
            }
            Op::TextDrawAdjusted { array } => {
                for item in array {
                    match item {
                        TextDrawAdjusted::Text(text) => {
                            let piece = decode_pdf_string(
                                text,
                                current_font.as_ref(),
                                resolver,
                                resources,
                                &mut tounicode_cache,
                            );
                            append_text_piece(&mut out, &piece, &mut pending_space);
                        }
                        TextDrawAdjusted::Spacing(spacing) => {
                            if *spacing <= TJ_INSERT_SPACE_THRESHOLD {
                                pending_space = true;
                            }
                        }
                    }
                }
            }
            Op::TextNewline => {
                out.push('\n');
                pending_space = false;
            }
            Op::MoveTextPosition { translation } => {
                if translation.y < 0.0 {
                    out.push('\n');
                    pending_space = false;
                }
            }
            _ => {}
        }
    }

    out
}

fn append_text_piece(out: &mut String, piece: &str, pending_space: &mut bool) {
    let sanitized = sanitize_extracted_text(piece);
    if sanitized.is_empty() {
        return;
    }

    if *pending_space {
        let glued_punctuation = sanitized
            .chars()
            .next()
            .is_some_and(|ch| matches!(ch, ',' | '.' | ';' | ':' | '!' | '?' | ')' | ']' | '}'));
        if !out.is_empty()
            && !glued_punctuation
            && !out.ends_with([' ', '\n', '\t'])
            && !sanitized.starts_with(char::is_whitespace)
        {
            out.push(' ');
        }
        *pending_space = false;
    }
    out.push_str(&sanitized);
}

fn decode_pdf_string(
    text: &PdfString,
    font_name: Option<&Name>,
    resolver: &impl Resolve,
    resources: &Resources,
    cache: &mut HashMap<Name, Option<ToUnicodeMap>>,
) -> String {
    let Some(font_name) = font_name else {
        return text.to_string_lossy();
    };
    if !cache.contains_key(font_name) {
        let map = resources
            .fonts
            .get(font_name)
            .and_then(|lazy| lazy.load(resolver).ok())
            .and_then(|font| font.to_unicode(resolver))
            .and_then(|res| res.ok());
        cache.insert(font_name.clone(), map);
    }
    match cache.get(font_name).and_then(|map| map.as_ref()) {
        Some(map) => decode_with_tounicode(text.as_bytes(), map)
            .unwrap_or_else(|| text.to_string_lossy()),
        None => text.to_string_lossy(),
    }
}

/// Try one- and two-byte codes and keep whichever the map explains better.
fn decode_with_tounicode(bytes: &[u8], map: &ToUnicodeMap) -> Option<String> {
    let lookup = |code: u16| map.get(code);
    let mut best = decode_codes(bytes, 1, lookup);
    if bytes.len() % 2 == 0 {
        let wide = decode_codes(bytes, 2, lookup);
        if wide.matched > best.matched
            || (wide.matched == best.matched && wide.text.len() > best.text.len())
        {
            best = wide;
        }
    }
    best.accept()
}

struct Decoded {
    text: String,
    matched: usize,
    total: usize,
}

impl Decoded {
    fn accept(self) -> Option<String> {
        if self.total == 0 {
            return None;
        }
        let ratio = self.matched as f32 / self.total as f32;
        if (self.matched < 2 && ratio < 0.3) || ratio < 0.05 {
            return None;
        }
        Some(self.text)
    }
}

fn decode_codes<'m>(bytes: &[u8], width: usize, lookup: impl Fn(u16) -> Option<&'m str>) -> Decoded {
    let mut decoded = Decoded {
        text: String::new(),
        matched: 0,
        total: 0,
    };
    for code in bytes.chunks_exact(width) {
        let code = match code {
            [byte] => u16::from(*byte),
            [high, low] => u16::from_be_bytes([*high, *low]),
            _ => continue,
        };
        decoded.total += 1;
        match lookup(code) {
            Some(piece) => {
                decoded.text.push_str(piece);
                decoded.matched += 1;
            }
            None => decoded.text.push('\u{FFFD}'),
        }
    }
    decoded
}

fn sanitize_extracted_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\n' | '\t' => out.push(ch),
            '\r' => out.push('\n'),
            '\u{FFFD}' | '\0' => {}
            _ if ch.is_control() => {}
            _ if is_private_use(ch as u32) => {}
            _ => out.push(ch),
        }
    }
    out
}

fn is_private_use(code: u32) -> bool {
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}
