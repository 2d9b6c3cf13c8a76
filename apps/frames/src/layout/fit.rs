//! Auto-fit sizer: the largest font size whose wrapped text fits a box.
//!
//! # Search
//! Sizes are tried from `start_size` down to `min_size` by `size_step`, with
//! `min_size` always tried last. The first size whose `line_count * line_height`
//! fits `box_height` wins, so the result is the largest fitting size in range.
//!
//! # Fallback
//! When nothing fits, the text is wrapped at `min_size` and cut to as many lines
//! as the box holds (at least one). If that removed lines, the last kept line is
//! shortened until it fits with a trailing ellipsis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LayoutError;
use crate::layout::measure::{
    FontMetrics, FontRef, FontSpec, MemoOracle, Px, WidthOracle, DEFAULT_STYLE,
};
use crate::layout::tokenizer::tokenize;
use crate::layout::wrap::{wrap, Line};

pub const ELLIPSIS: &str = "…";

// ────────────────────────────────────────────────────────────────────────────
// Request / result types
// ────────────────────────────────────────────────────────────────────────────

/// Everything one fit operation needs besides the measurement providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitRequest {
    pub text: String,
    pub font_family_ref: FontRef,
    #[serde(default = "default_style")]
    pub style: String,
    pub start_size: u32,
    pub min_size: u32,
    pub size_step: u32,
    pub box_width: Px,
    pub box_height: Px,
    #[serde(default)]
    pub line_spacing: Px,
}

fn default_style() -> String {
    DEFAULT_STYLE.to_string()
}

/// Outcome of a fit. `truncated` marks the min-size fallback, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitResult {
    pub chosen_size: u32,
    pub lines: Vec<Line>,
    pub truncated: bool,
}

impl FitRequest {
    /// Checks `start_size >= min_size` and `size_step >= 1`.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.start_size < self.min_size {
            return Err(LayoutError::InvalidSizeRange {
                start_size: self.start_size,
                min_size: self.min_size,
            });
        }
        if self.size_step == 0 {
            return Err(LayoutError::InvalidSizeStep(self.size_step));
        }
        Ok(())
    }

    /// Candidate sizes, largest first, ending with `min_size`.
    pub fn size_candidates(&self) -> Vec<u32> {
        if self.start_size < self.min_size {
            return vec![self.min_size];
        }
        let step = self.size_step.max(1) as usize;
        let mut sizes: Vec<u32> = (self.min_size..=self.start_size)
            .rev()
            .step_by(step)
            .collect();
        if sizes.last() != Some(&self.min_size) {
            sizes.push(self.min_size);
        }
        sizes
    }

    pub fn font_at(&self, size: u32) -> FontSpec {
        FontSpec::new(self.font_family_ref.clone(), size).with_style(self.style.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fit
// ────────────────────────────────────────────────────────────────────────────

/// Finds the largest size in range at which `request.text` fits its box.
///
/// Only an invalid size range is an error; degenerate boxes produce
/// degenerate but well-formed results.
pub fn fit<O, M>(request: &FitRequest, oracle: &O, metrics: &M) -> Result<FitResult, LayoutError>
where
    O: WidthOracle + ?Sized,
    M: FontMetrics + ?Sized,
{
    request.validate()?;

    let tokens = tokenize(&request.text);
    let oracle = MemoOracle::new(oracle);

    for size in request.size_candidates() {
        let font = request.font_at(size);
        let lines = wrap(&tokens, &oracle, &font, request.box_width);
        let line_height = metrics.line_height(&font, request.line_spacing);

        if fits_height(lines.len(), line_height, request.box_height) {
            debug!(
                size,
                lines = lines.len(),
                line_height,
                "Auto-fit: accepted size"
            );
            return Ok(FitResult {
                chosen_size: size,
                lines,
                truncated: false,
            });
        }
    }

    let font = request.font_at(request.min_size);
    let mut lines = wrap(&tokens, &oracle, &font, request.box_width);
    let line_height = metrics.line_height(&font, request.line_spacing);
    let max_lines = max_lines(request.box_height, line_height, lines.len());
    let total_lines = lines.len();

    if total_lines > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(&last.text, &oracle, &font, request.box_width);
        }
    }

    debug!(
        size = request.min_size,
        kept = lines.len(),
        total = total_lines,
        "Auto-fit: no size fits, truncated at minimum size"
    );

    Ok(FitResult {
        chosen_size: request.min_size,
        lines,
        truncated: true,
    })
}

/// Shortens `text` one codepoint at a time until `text + "…"` fits `max_width`.
///
/// Returns just the ellipsis when no prefix fits.
pub fn ellipsize<O: WidthOracle + ?Sized>(
    text: &str,
    oracle: &O,
    font: &FontSpec,
    max_width: Px,
) -> Line {
    let mut kept = text.to_string();
    loop {
        let candidate = format!("{kept}{ELLIPSIS}");
        let width = oracle.measure(&candidate, font);
        if width <= max_width || kept.is_empty() {
            return Line {
                text: candidate,
                width,
            };
        }
        kept.pop();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// No lines always fit, whatever the box.
fn fits_height(line_count: usize, line_height: Px, box_height: Px) -> bool {
    line_count == 0 || line_count as i64 * line_height as i64 <= box_height as i64
}

/// Lines a box holds at `line_height`, floored at one. A non-positive line
/// height keeps every line.
fn max_lines(box_height: Px, line_height: Px, line_count: usize) -> usize {
    if line_height <= 0 {
        return line_count.max(1);
    }
    (box_height / line_height).max(1) as usize
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
