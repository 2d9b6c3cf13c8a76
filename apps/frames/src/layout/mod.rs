// Adaptive text layout: tokenize, wrap, auto-fit, place.
// Pure and synchronous; measurement is supplied by the caller.

pub mod fit;
pub mod measure;
pub mod metrics_table;
pub mod place;
pub mod tokenizer;
pub mod wrap;

// Re-export the public API consumed by the frame planner.
pub use fit::{ellipsize, fit, FitRequest, FitResult, ELLIPSIS};
pub use measure::{FontMetrics, FontRef, FontSpec, MemoOracle, Px, WidthOracle};
pub use metrics_table::{ApproxMetrics, CJK_SANS, LATIN_SANS};
pub use place::{place, Align, LayoutBox, PlacedLine};
pub use tokenizer::{classify, tokenize, ScriptClass, Token};
pub use wrap::{wrap, Line};
