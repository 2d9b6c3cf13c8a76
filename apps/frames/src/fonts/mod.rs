//! Font roles and the measurement provider handed to the layout engine.

pub mod face;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{
    ApproxMetrics, FontMetrics, FontRef, FontSpec, Px, WidthOracle, CJK_SANS, LATIN_SANS,
};

pub use face::FontFace;

/// The two faces a frame is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    /// Chinese face, also used for mixed headers.
    Cn,
    /// Latin face.
    En,
}

impl FontRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FontRole::Cn => "cn",
            FontRole::En => "en",
        }
    }

    pub fn font_ref(self) -> FontRef {
        FontRef::new(self.as_str())
    }

    pub fn from_font_ref(font: &FontRef) -> Option<Self> {
        match font.as_str() {
            "cn" => Some(FontRole::Cn),
            "en" => Some(FontRole::En),
            _ => None,
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a role's metrics come from.
#[derive(Debug, Clone)]
pub enum FaceSource {
    File(FontFace),
    Approx(&'static ApproxMetrics),
}

impl FaceSource {
    pub fn describe(&self) -> String {
        match self {
            FaceSource::File(face) => format!("font file ({} units/em)", face.units_per_em()),
            FaceSource::Approx(table) => format!("built-in {} metrics", table.name),
        }
    }
}

/// Read-only face registry, shareable across worker threads.
///
/// Families other than `cn`/`en` measure with the Latin source; the frame
/// template only ever asks for the two roles.
#[derive(Debug, Clone)]
pub struct FontLibrary {
    cn: FaceSource,
    en: FaceSource,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::approximate()
    }
}

impl FontLibrary {
    /// Library backed entirely by the built-in approximate tables.
    pub fn approximate() -> Self {
        Self {
            cn: FaceSource::Approx(&CJK_SANS),
            en: FaceSource::Approx(&LATIN_SANS),
        }
    }

    pub fn with_face(mut self, role: FontRole, face: FontFace) -> Self {
        *self.slot_mut(role) = FaceSource::File(face);
        self
    }

    pub fn source(&self, role: FontRole) -> &FaceSource {
        match role {
            FontRole::Cn => &self.cn,
            FontRole::En => &self.en,
        }
    }

    fn slot_mut(&mut self, role: FontRole) -> &mut FaceSource {
        match role {
            FontRole::Cn => &mut self.cn,
            FontRole::En => &mut self.en,
        }
    }

    fn resolve(&self, font: &FontSpec) -> &FaceSource {
        self.source(FontRole::from_font_ref(&font.family).unwrap_or(FontRole::En))
    }
}

impl WidthOracle for FontLibrary {
    fn measure(&self, text: &str, font: &FontSpec) -> Px {
        match self.resolve(font) {
            FaceSource::File(face) => face.width_px(text, font.size),
            FaceSource::Approx(table) => table.measure(text, font),
        }
    }
}

impl FontMetrics for FontLibrary {
    fn ascent(&self, font: &FontSpec) -> Px {
        match self.resolve(font) {
            FaceSource::File(face) => face.ascent_px(font.size),
            FaceSource::Approx(table) => table.ascent(font),
        }
    }

    fn descent(&self, font: &FontSpec) -> Px {
        match self.resolve(font) {
            FaceSource::File(face) => face.descent_px(font.size),
            FaceSource::Approx(table) => table.descent(font),
        }
    }
}
