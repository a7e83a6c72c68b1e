//! Text measurement for pagination and the page-oriented emitters.
//!
//! Without registered faces every family uses Helvetica-like average advances
//! (0.5 em, 0.55 em bold). Registering a TTF/OTF face through `ttf-parser`
//! switches that family to real glyph advances.

use std::collections::HashMap;

use crate::richtext::Run;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

#[derive(Clone)]
struct Face {
    /// Raw font bytes (ttf-parser is zero-copy, so faces are re-parsed on use).
    bytes: Vec<u8>,
    units_per_em: f32,
}

/// Registered font faces, keyed by family and variant.
#[derive(Clone, Default)]
pub struct FontManager {
    faces: HashMap<FaceKey, Face>,
}

impl FontManager {
    /// A manager with no faces: heuristic metrics only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TTF/OTF face for `family`.
    pub fn register(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<(), String> {
        let face = ttf_parser::Face::parse(&bytes, 0).map_err(|e| format!("Failed to parse font: {e}"))?;
        let units_per_em = face.units_per_em() as f32;
        self.faces.insert(
            FaceKey {
                family: family.to_string(),
                bold,
                italic,
            },
            Face { bytes, units_per_em },
        );
        Ok(())
    }

    pub fn has_face(&self, family: &str) -> bool {
        self.faces.keys().any(|k| k.family == family)
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32, bold: bool, italic: bool, family: &str) -> f32 {
        let key = FaceKey {
            family: family.to_string(),
            bold,
            italic,
        };
        let face = self.faces.get(&key).or_else(|| {
            self.faces.get(&FaceKey {
                bold: false,
                italic: false,
                ..key.clone()
            })
        });

        let heuristic = || {
            let avg = if bold { 0.55 } else { 0.5 };
            text.chars().count() as f32 * size * avg
        };

        let Some(face) = face else {
            return heuristic();
        };
        match ttf_parser::Face::parse(&face.bytes, 0) {
            Ok(parsed) => {
                let scale = size / face.units_per_em;
                text.chars()
                    .map(|ch| match parsed.glyph_index(ch) {
                        Some(gid) => parsed.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => size * 0.5,
                    })
                    .sum()
            }
            Err(_) => heuristic(),
        }
    }

    /// Greedy word-wrap of plain text. Embedded newlines always break.
    pub fn wrap_text(&self, text: &str, size: f32, bold: bool, family: &str, max_width: f32) -> Vec<String> {
        if max_width <= 0.0 || text.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty()
                    && self.text_width(&candidate, size, bold, false, family) > max_width
                {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        lines
    }
}

/// A styled piece of one wrapped line, positioned relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub x: f32,
    pub width: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Wrap styled runs into lines of positioned segments. Words never split;
/// explicit line-break runs always start a new line.
pub fn wrap_runs(runs: &[Run], size: f32, family: &str, max_width: f32, fonts: &FontManager) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = Vec::new();
    let mut line: Vec<Segment> = Vec::new();
    let mut x = 0.0f32;

    for run in runs {
        if run.is_line_break() {
            lines.push(std::mem::take(&mut line));
            x = 0.0;
            continue;
        }
        for word in words_with_spaces(&run.text) {
            let fit = fonts.text_width(word.trim_end(), size, run.bold, run.italic, family);
            if x > 0.0 && x + fit > max_width {
                lines.push(std::mem::take(&mut line));
                x = 0.0;
            }
            let word = if x == 0.0 { word.trim_start() } else { word };
            if word.is_empty() {
                continue;
            }
            let width = fonts.text_width(word, size, run.bold, run.italic, family);
            match line.last_mut() {
                Some(seg)
                    if seg.bold == run.bold
                        && seg.italic == run.italic
                        && seg.underline == run.underline =>
                {
                    seg.text.push_str(word);
                    seg.width += width;
                }
                _ => line.push(Segment {
                    text: word.to_string(),
                    x,
                    width,
                    bold: run.bold,
                    italic: run.italic,
                    underline: run.underline,
                }),
            }
            x += width;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split into words that keep their trailing whitespace.
fn words_with_spaces(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_space = false;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if prev_space && !space {
            out.push(&text[start..i]);
            start = i;
        }
        prev_space = space;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
