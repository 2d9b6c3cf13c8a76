//! Measurement capabilities consumed by the layout engine.
//!
//! The engine never interprets font data. It hands a [`FontSpec`] to a
//! [`WidthOracle`] for widths and to [`FontMetrics`] for vertical metrics.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pixel quantity. Signed so degenerate (negative) boxes stay representable.
pub type Px = i32;

pub const DEFAULT_STYLE: &str = "regular";

/// Opaque font-family handle, resolved only by the measurement provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontRef(pub String);

impl FontRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A font family at one pixel size and style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontRef,
    pub size: u32,
    pub style: String,
}

impl FontSpec {
    pub fn new(family: FontRef, size: u32) -> Self {
        Self {
            family,
            size,
            style: DEFAULT_STYLE.to_string(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Measures the advance width of a string.
///
/// Preconditions on implementors: equal `(text, font)` pairs measure equally,
/// `measure("", _) == 0`, and widths are never negative. The engine relies on
/// these and does not guard against a provider that breaks them.
pub trait WidthOracle {
    fn measure(&self, text: &str, font: &FontSpec) -> Px;
}

/// Vertical font metrics in pixels for a given font and size.
pub trait FontMetrics {
    fn ascent(&self, font: &FontSpec) -> Px;

    /// Distance below the baseline, as a positive number.
    fn descent(&self, font: &FontSpec) -> Px;

    /// `ascent + descent + line_spacing`.
    fn line_height(&self, font: &FontSpec, line_spacing: Px) -> Px {
        self.ascent(font) + self.descent(font) + line_spacing
    }
}

impl<T: WidthOracle + ?Sized> WidthOracle for &T {
    fn measure(&self, text: &str, font: &FontSpec) -> Px {
        (**self).measure(text, font)
    }
}

impl<T: FontMetrics + ?Sized> FontMetrics for &T {
    fn ascent(&self, font: &FontSpec) -> Px {
        (**self).ascent(font)
    }

    fn descent(&self, font: &FontSpec) -> Px {
        (**self).descent(font)
    }
}

/// Memoizing wrapper for one fit operation.
///
/// The size search re-measures the same prefixes at every candidate size, so
/// widths are cached per font and text. Not `Sync`; build one per call.
pub struct MemoOracle<'a, O: ?Sized> {
    inner: &'a O,
    cache: RefCell<HashMap<FontSpec, HashMap<String, Px>>>,
}

impl<'a, O: WidthOracle + ?Sized> MemoOracle<'a, O> {
    pub fn new(inner: &'a O) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct measurements cached so far.
    #[cfg(test)]
    pub(crate) fn cached_entries(&self) -> usize {
        self.cache.borrow().values().map(HashMap::len).sum()
    }
}

impl<O: WidthOracle + ?Sized> WidthOracle for MemoOracle<'_, O> {
    fn measure(&self, text: &str, font: &FontSpec) -> Px {
        if text.is_empty() {
            return 0;
        }
        if let Some(width) = self
            .cache
            .borrow()
            .get(font)
            .and_then(|by_text| by_text.get(text))
        {
            return *width;
        }

        let width = self.inner.measure(text, font);
        self.cache
            .borrow_mut()
            .entry(font.clone())
            .or_default()
            .insert(text.to_string(), width);
        width
    }
}
