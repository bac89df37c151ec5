use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::layout::geometry::Size;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// A resolved font: what the label is measured and drawn with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub style: String,
    pub weight: Option<String>,
    /// Absolute line height in pixels.
    pub line_height: f32,
}

impl Font {
    /// CSS shorthand, e.g. `italic bold 12px Arial`.
    pub fn css(&self) -> String {
        let mut out = String::new();
        if !self.style.is_empty() {
            out.push_str(&self.style);
            out.push(' ');
        }
        if let Some(weight) = self.weight.as_deref().filter(|w| !w.is_empty()) {
            out.push_str(weight);
            out.push(' ');
        }
        out.push_str(&format!("{}px {}", self.size, self.family));
        out
    }

    fn query_weight(&self) -> Weight {
        match self.weight.as_deref().map(str::trim) {
            Some("bold") | Some("bolder") => Weight::BOLD,
            Some("lighter") => Weight::LIGHT,
            Some(raw) => raw.parse::<u16>().map(Weight).unwrap_or(Weight::NORMAL),
            None => Weight::NORMAL,
        }
    }

    fn query_style(&self) -> Style {
        match self.style.trim() {
            "italic" => Style::Italic,
            "oblique" => Style::Oblique,
            _ => Style::Normal,
        }
    }
}

/// Text measurement service used when labels are built.
pub trait MeasureText {
    /// Advance width of a single line of text.
    fn measure(&self, text: &str, font: &Font) -> f32;
}

/// Measures with system fonts through fontdb, falling back to calibrated
/// glyph widths when no face matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMetrics;

impl MeasureText for SystemFontMetrics {
    fn measure(&self, text: &str, font: &Font) -> f32 {
        measure_text_width(text, font).unwrap_or_else(|| fallback_text_width(text, font.size))
    }
}

/// Calibrated per-glyph widths only. Deterministic across machines.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMetrics;

impl MeasureText for FallbackMetrics {
    fn measure(&self, text: &str, font: &Font) -> f32 {
        fallback_text_width(text, font.size)
    }
}

/// Widest line by line count times line height.
pub fn text_size<M: MeasureText + ?Sized>(measurer: &M, lines: &[String], font: &Font) -> Size {
    let width = lines
        .iter()
        .map(|line| measurer.measure(line, font))
        .fold(0.0, f32::max);
    Size {
        width,
        height: lines.len() as f32 * font.line_height,
    }
}

pub fn measure_text_width(text: &str, font: &Font) -> Option<f32> {
    if text.is_empty() || font.size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.measure(text, font)
}

pub fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Helvetica/Arial advance widths per em.
    match ch {
        ' ' => 0.278,
        '.' | ',' | ':' | ';' | '!' | '|' | 'i' | 'j' | 'l' => 0.222,
        '(' | ')' | '[' | ']' | '-' | 'f' | 't' | 'r' => 0.333,
        '%' => 0.889,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 0.667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 0.722,
        'F' | 'T' | 'Z' => 0.611,
        'G' | 'O' | 'Q' => 0.778,
        'I' => 0.278,
        'J' | 's' | 'c' | 'k' | 'v' | 'x' | 'y' | 'z' => 0.5,
        'L' => 0.556,
        'M' => 0.833,
        'W' => 0.944,
        'm' => 0.833,
        'w' => 0.722,
        '0'..='9' => 0.556,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 0.556,
        '@' => 1.015,
        '&' => 0.667,
        '#' | '$' | '?' | '_' => 0.556,
        _ => 0.6,
    }
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font: &Font) -> Option<f32> {
        let key = face_key(font);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font, &key);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key).and_then(|face| face.as_mut())?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font.size)
    }

    fn load_face(&mut self, font: &Font, key: &str) -> Option<FontFace> {
        if let Some(face) = load_cached_face(key) {
            return Some(face);
        }
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font.family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    order.push(FamilyToken::Name(names.len()));
                    names.push(raw.to_string());
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let families: Vec<Family<'_>> = order
            .into_iter()
            .map(|token| match token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            tracing::debug!(faces = self.db.len(), "loaded system fonts");
        }

        let query = Query {
            families: &families,
            weight: font.query_weight(),
            stretch: Stretch::Normal,
            style: font.query_style(),
        };
        let Some(id) = self.db.query(&query) else {
            tracing::debug!(family = %font.family, "no system face matched, using fallback widths");
            return None;
        };
        self.db
            .with_face_data(id, |data, index| {
                let bytes = data.to_vec();
                let face = FontFace::parse(bytes, index)?;
                if let Some((font_path, meta_path)) = cache_paths(key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &face.data);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                Some(face)
            })
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
            return Some(width.max(0.0));
        }

        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !self.advance_cache.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok()?;
            for ch in missing {
                let advance = face
                    .glyph_index(ch)
                    .map(|glyph| face.glyph_hor_advance(glyph).unwrap_or(0));
                self.advance_cache.insert(ch, advance);
            }
        }

        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            match self.advance_cache.get(&ch).copied().flatten() {
                Some(advance) => width += advance as f32 * scale,
                None => width += fallback,
            }
        }
        Some(width.max(0.0))
    }
}

fn face_key(font: &Font) -> String {
    let family = font.family.trim();
    let family = if family.is_empty() { "sans-serif" } else { family };
    format!(
        "{family}|{}|{}",
        font.style.trim(),
        font.weight.as_deref().unwrap_or("normal")
    )
}

fn cache_paths(key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("pie-outlabels").join("font-cache");
    Some((dir.join(format!("{hash:x}.font")), dir.join(format!("{hash:x}.meta"))))
}

fn load_cached_face(key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::parse(bytes, index)
}
