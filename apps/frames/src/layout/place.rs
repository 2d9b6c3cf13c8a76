//! Layout placer: absolute pixel origins for finished lines inside a box.

use serde::{Deserialize, Serialize};

use crate::layout::measure::{FontMetrics, FontSpec, Px};
use crate::layout::wrap::Line;

/// Horizontal alignment within a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Pixel rectangle `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
}

impl LayoutBox {
    pub const fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

/// A line with its top-left origin, ready for a rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: Px,
    pub y: Px,
    pub width: Px,
}

/// Places `lines` top to bottom inside `region`.
///
/// With `vertical_centering` the block is centered when it is shorter than the
/// box; otherwise it starts at the top. Lines whose bottom would pass the box
/// bottom are dropped, along with everything after them.
pub fn place<M: FontMetrics + ?Sized>(
    lines: &[Line],
    region: LayoutBox,
    font: &FontSpec,
    metrics: &M,
    align: Align,
    line_spacing: Px,
    vertical_centering: bool,
) -> Vec<PlacedLine> {
    let line_height = metrics.line_height(font, line_spacing) as i64;
    let block_height = lines.len() as i64 * line_height;
    let box_height = region.height as i64;

    let mut y = region.y as i64;
    if vertical_centering && block_height < box_height {
        y += (box_height - block_height) / 2;
    }

    let mut placed = Vec::with_capacity(lines.len());
    for line in lines {
        if y + line_height > region.bottom() {
            break;
        }
        placed.push(PlacedLine {
            text: line.text.clone(),
            x: line_x(region, line.width, align),
            y: y as Px,
            width: line.width,
        });
        y += line_height;
    }
    placed
}

/// Never left of `region.x`, even for a line wider than the box.
fn line_x(region: LayoutBox, width: Px, align: Align) -> Px {
    let slack = (region.width as i64 - width as i64).max(0);
    let offset = match align {
        Align::Left => 0,
        Align::Right => slack,
        Align::Center => slack / 2,
    };
    (region.x as i64 + offset) as Px
}
