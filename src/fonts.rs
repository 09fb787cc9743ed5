//! Font metrics and text measurement using `ttf-parser`.
//!
//! Glyphs are always drawn with the PDF builtin Helvetica family, so the
//! default manager measures with the Helvetica faces bundled in `printpdf`.
//! A flat per-character estimate remains as a fallback when no face parses.

use std::collections::HashMap;

use printpdf::BuiltinFont;

use crate::block::Span;
use crate::error::{Error, Result};

/// Text measurement capability the block model depends on.
pub trait TextMeasure {
    /// Width in points of `text` set at `font_size`.
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32;
}

/// A loaded font face.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
}

impl FontData {
    fn synthetic() -> Self {
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
}

impl FontKey {
    fn helvetica(bold: bool) -> Self {
        Self {
            family: "Helvetica".to_string(),
            bold,
        }
    }
}

/// Manages the faces used for measurement.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
}

impl FontManager {
    /// A manager with no faces; every measurement uses the heuristic.
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TTF/OTF face used to measure the regular or bold weight.
    pub fn load_font(&mut self, bold: bool, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::Font(format!("Failed to parse font: {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            bytes,
        };
        log::debug!(
            "Loaded measurement face (bold={bold}, {} units/em)",
            data.units_per_em
        );
        self.fonts.insert(FontKey::helvetica(bold), data);
        Ok(())
    }

    /// Load the builtin Helvetica and Helvetica-Bold faces the renderer
    /// draws with.
    pub fn load_builtin(&mut self) -> Result<()> {
        self.load_font(false, BuiltinFont::Helvetica.get_subset_font().bytes)?;
        self.load_font(true, BuiltinFont::HelveticaBold.get_subset_font().bytes)
    }

    /// Register synthetic Helvetica-like metrics for any weight still missing.
    pub fn ensure_default(&mut self) {
        for bold in [false, true] {
            self.fonts
                .entry(FontKey::helvetica(bold))
                .or_insert_with(FontData::synthetic);
        }
    }

    pub fn get(&self, bold: bool) -> Option<&FontData> {
        self.fonts
            .get(&FontKey::helvetica(bold))
            .or_else(|| self.fonts.get(&FontKey::helvetica(false)))
    }

    /// Measure the width of a string at a given font size (in pt).
    /// If we have actual font bytes, we parse glyph advances. Otherwise we
    /// use an average character width heuristic (0.5 × font_size per char).
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let heuristic = || {
            // Bold is ~10 % wider.
            let avg = if bold { 0.55 } else { 0.5 };
            text.chars().count() as f32 * font_size * avg
        };

        let data = match self.get(bold) {
            Some(d) if !d.bytes.is_empty() => d,
            _ => return heuristic(),
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        // Fallback for missing glyph
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => heuristic(),
        }
    }

    /// Check if real font bytes are loaded for the regular weight.
    pub fn has_real_fonts(&self) -> bool {
        self.get(false).map(|d| !d.bytes.is_empty()).unwrap_or(false)
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        if let Err(e) = mgr.load_builtin() {
            log::warn!("Measuring with estimated widths: {e}");
        }
        mgr.ensure_default();
        mgr
    }
}

impl TextMeasure for FontManager {
    fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        self.measure_text_width(text, font_size, bold)
    }
}

/// A run of text inside one wrapped line, tied to the span it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
    pub span: usize,
    pub text: String,
    pub width: f32,
}

/// One wrapped line of rich text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLine {
    pub runs: Vec<LineRun>,
    pub width: f32,
}

impl WrappedLine {
    fn push(&mut self, span: usize, text: &str, width: f32) {
        match self.runs.last_mut() {
            Some(last) if last.span == span => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.runs.push(LineRun {
                span,
                text: text.to_string(),
                width,
            }),
        }
        self.width += width;
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

enum Token<'a> {
    Word(usize, &'a str),
    Space(usize),
    Newline,
}

fn tokenize(spans: &[Span]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (idx, span) in spans.iter().enumerate() {
        for (n, paragraph) in span.text.split('\n').enumerate() {
            if n > 0 {
                tokens.push(Token::Newline);
            }
            let mut rest = paragraph;
            while !rest.is_empty() {
                let start = rest.trim_start();
                if start.len() != rest.len() {
                    tokens.push(Token::Space(idx));
                }
                if start.is_empty() {
                    break;
                }
                let end = start.find(char::is_whitespace).unwrap_or(start.len());
                tokens.push(Token::Word(idx, &start[..end]));
                rest = &start[end..];
            }
        }
    }
    tokens
}

/// Word-wrap styled spans to fit within `max_width` points.
///
/// Runs of whitespace collapse to a single space; explicit newlines start a
/// new line. A word wider than `max_width` starts a new line and is split at
/// character boundaries into pieces that fit (a single character that is
/// itself too wide still gets a line). Always returns at least one (possibly
/// empty) line.
pub fn wrap_spans(
    spans: &[Span],
    base_size: f32,
    base_bold: bool,
    max_width: f32,
    fonts: &dyn TextMeasure,
) -> Vec<WrappedLine> {
    let measure = |idx: usize, text: &str| {
        let span = &spans[idx];
        fonts.text_width(
            text,
            span.font_size.unwrap_or(base_size),
            span.bold || base_bold,
        )
    };

    let mut lines = Vec::new();
    let mut current = WrappedLine::default();
    let mut pending_space: Option<usize> = None;

    for token in tokenize(spans) {
        match token {
            Token::Space(idx) => {
                if !current.runs.is_empty() && pending_space.is_none() {
                    pending_space = Some(idx);
                }
            }
            Token::Newline => {
                lines.push(std::mem::take(&mut current));
                pending_space = None;
            }
            Token::Word(idx, word) => {
                let word_w = measure(idx, word);
                let space_w = pending_space.map(|s| measure(s, " ")).unwrap_or(0.0);
                if max_width > 0.0
                    && !current.runs.is_empty()
                    && current.width + space_w + word_w > max_width
                {
                    lines.push(std::mem::take(&mut current));
                } else if let Some(s) = pending_space {
                    current.push(s, " ", space_w);
                }
                pending_space = None;
                if max_width > 0.0 && word_w > max_width {
                    let mut rest = word;
                    loop {
                        let cut = fit_prefix(rest, max_width, |t| measure(idx, t));
                        let (piece, tail) = rest.split_at(cut);
                        current.push(idx, piece, measure(idx, piece));
                        if tail.is_empty() {
                            break;
                        }
                        lines.push(std::mem::take(&mut current));
                        rest = tail;
                    }
                } else {
                    current.push(idx, word, word_w);
                }
            }
        }
    }
    if !current.runs.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte length of the longest prefix of `word` no wider than `max_width`,
/// never less than one character.
fn fit_prefix(word: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> usize {
    let mut width = 0.0;
    let mut buf = [0u8; 4];
    for (i, ch) in word.char_indices() {
        width += measure(ch.encode_utf8(&mut buf));
        if width > max_width {
            return if i == 0 { ch.len_utf8() } else { i };
        }
    }
    word.len()
}
