//! TrueType/OpenType face metrics via `ttf-parser`.

use std::fmt;
use std::path::Path;

use tracing::debug;
use ttf_parser::{Face, GlyphId};

use crate::errors::FrameError;
use crate::layout::Px;

/// A parsed font file kept as raw bytes plus validated metrics.
///
/// `ttf_parser::Face` borrows its data, so the face is re-parsed on each
/// measurement; parsing only reads table headers.
#[derive(Clone)]
pub struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl FontFace {
    /// Validates `data` as a font (or face `index` of a collection).
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, FrameError> {
        let (units_per_em, ascender, descender) = {
            let face = Face::parse(&data, index).map_err(|e| {
                FrameError::Font(format!("Failed to parse font face {index}: {e}"))
            })?;
            (face.units_per_em(), face.ascender(), face.descender())
        };

        if units_per_em == 0 {
            return Err(FrameError::Font(format!(
                "Font face {index} reports zero units per em"
            )));
        }

        Ok(Self {
            data,
            index,
            units_per_em,
            ascender,
            descender,
        })
    }

    /// Reads and validates a font file.
    pub async fn load(path: &Path, index: u32) -> Result<Self, FrameError> {
        let data = tokio::fs::read(path).await?;
        let face = Self::from_bytes(data, index)?;
        debug!(
            path = %path.display(),
            index,
            units_per_em = face.units_per_em,
            "Loaded font face"
        );
        Ok(face)
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Sum of horizontal advances in font units. Unmapped characters use the
    /// `.notdef` advance, or half an em when even that is missing.
    pub fn advance_units(&self, text: &str) -> u64 {
        let half_em = self.units_per_em / 2;
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return text.chars().count() as u64 * half_em as u64;
        };
        text.chars()
            .map(|c| {
                let glyph = face.glyph_index(c).unwrap_or(GlyphId(0));
                face.glyph_hor_advance(glyph).unwrap_or(half_em) as u64
            })
            .sum()
    }

    pub fn width_px(&self, text: &str, size: u32) -> Px {
        if text.is_empty() {
            return 0;
        }
        self.scale(self.advance_units(text) as f64, size)
    }

    pub fn ascent_px(&self, size: u32) -> Px {
        self.scale(self.ascender as f64, size)
    }

    /// Positive distance below the baseline.
    pub fn descent_px(&self, size: u32) -> Px {
        self.scale((self.descender as f64).abs(), size)
    }

    fn scale(&self, units: f64, size: u32) -> Px {
        (units * size as f64 / self.units_per_em as f64).round() as Px
    }
}
