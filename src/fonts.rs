//! Shared font resources.
//!
//! The order PDF and the hanko image both draw Japanese text with the bundled
//! IPAex Gothic face. The file is loaded once at startup and shared read-only;
//! when it is missing (checkouts without the font asset) rendering degrades
//! instead of failing: the PDF falls back to the built-in Helvetica and the
//! hanko keeps its ring without glyphs.

use rusttype::{point, Font, Scale};
use std::fs;
use std::path::PathBuf;

const FONT_PATH_ENV: &str = "JAPANESE_FONT_PATH";
const BUNDLED_FONT: &str = "fonts/ipaexg.ttf";

pub struct FontStore {
    bytes: Option<Vec<u8>>,
    font: Option<Font<'static>>,
}

impl FontStore {
    pub fn load() -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var(FONT_PATH_ENV) {
            if !path.is_empty() {
                candidates.push(PathBuf::from(path));
            }
        }
        candidates.push(PathBuf::from(BUNDLED_FONT));
        candidates.push(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fonts/ipaexg.ttf"
        )));

        for candidate in candidates {
            let Ok(bytes) = fs::read(&candidate) else {
                continue;
            };
            match Font::try_from_vec(bytes.clone()) {
                Some(font) => {
                    log::info!("Japanese font loaded from {}", candidate.display());
                    return Self {
                        bytes: Some(bytes),
                        font: Some(font),
                    };
                }
                None => {
                    log::warn!("{} is not a parseable TrueType font", candidate.display());
                }
            }
        }

        log::warn!("Japanese font not found; falling back to built-in glyphs");
        Self {
            bytes: None,
            font: None,
        }
    }

    pub fn has_japanese(&self) -> bool {
        self.font.is_some()
    }

    /// Raw TTF bytes for embedding into a PDF, when the face is available.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Parsed face for glyph rasterization and measurement.
    pub fn glyph_font(&self) -> Option<&Font<'static>> {
        self.font.as_ref()
    }

    /// Approximate rendered width of `text` at `size_pt`, in PDF points.
    ///
    /// Uses real glyph advances when the face is loaded; otherwise an
    /// em-based estimate (full-width characters count one em, ASCII half).
    pub fn text_width_pt(&self, text: &str, size_pt: f32) -> f32 {
        if let Some(font) = &self.font {
            let scale = Scale::uniform(size_pt);
            font.layout(text, scale, point(0.0, 0.0))
                .last()
                .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                .unwrap_or(0.0)
        } else {
            text.chars()
                .map(|c| if c.is_ascii() { size_pt * 0.52 } else { size_pt })
                .sum()
        }
    }

    pub fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        self.text_width_pt(text, size_pt) * 25.4 / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_estimate_scales_with_length() {
        let store = FontStore::load();
        let short = store.text_width_pt("発注", 10.0);
        let long = store.text_width_pt("発注書類一式", 10.0);
        assert!(long > short);
    }

    #[test]
    fn width_estimate_zero_for_empty_text() {
        let store = FontStore::load();
        assert_eq!(store.text_width_pt("", 10.0), 0.0);
    }
}
