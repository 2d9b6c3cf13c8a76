//! Built-in approximate font metrics.
//!
//! Used when no font file is configured for a role. Widths are in em units and
//! bucketed by glyph shape rather than tabulated per glyph: close enough to pick
//! sensible sizes and line breaks, and fully deterministic.
//!
//! Ideographs, CJK punctuation and fullwidth forms are one em wide. Other
//! non-ASCII codepoints use `fallback_em`.

use crate::layout::measure::{FontMetrics, FontSpec, Px, WidthOracle};

/// Static width/metric profile for one kind of face.
#[derive(Debug)]
pub struct ApproxMetrics {
    pub name: &'static str,
    /// Multiplier applied to the ASCII shape buckets (a CJK face's Latin is narrower).
    pub latin_scale: f32,
    pub fallback_em: f32,
    pub ascent_em: f32,
    pub descent_em: f32,
}

/// Proportional sans-serif, for Latin text.
pub static LATIN_SANS: ApproxMetrics = ApproxMetrics {
    name: "latin-sans",
    latin_scale: 1.0,
    fallback_em: 0.55,
    ascent_em: 0.8,
    descent_em: 0.2,
};

/// CJK face with proportional Latin glyphs.
pub static CJK_SANS: ApproxMetrics = ApproxMetrics {
    name: "cjk-sans",
    latin_scale: 0.92,
    fallback_em: 1.0,
    ascent_em: 0.88,
    descent_em: 0.12,
};

impl ApproxMetrics {
    /// Width of one codepoint in em units.
    pub fn char_em(&self, c: char) -> f32 {
        if is_full_width(c) {
            return 1.0;
        }
        if !c.is_ascii() {
            return self.fallback_em;
        }
        let shape = match c {
            ' ' => 0.25,
            'i' | 'l' | 'j' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | '`' => 0.26,
            'f' | 'r' | 't' | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '"' | '/' | '\\' => 0.34,
            'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.85,
            'A'..='Z' => 0.66,
            '0'..='9' => 0.56,
            _ => 0.52,
        };
        shape * self.latin_scale
    }

    /// Width of a string in em units.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_em(c)).sum()
    }
}

fn is_full_width(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'   // CJK symbols and punctuation
        | '\u{3400}'..='\u{4DBF}' // extension A
        | '\u{4E00}'..='\u{9FFF}' // unified ideographs
        | '\u{FF01}'..='\u{FF60}' // fullwidth forms
    )
}

fn em_to_px(em: f32, size: u32) -> Px {
    (em * size as f32).round() as Px
}

impl WidthOracle for ApproxMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> Px {
        em_to_px(self.measure_em(text), font.size)
    }
}

impl FontMetrics for ApproxMetrics {
    fn ascent(&self, font: &FontSpec) -> Px {
        em_to_px(self.ascent_em, font.size)
    }

    fn descent(&self, font: &FontSpec) -> Px {
        em_to_px(self.descent_em, font.size)
    }
}
