use thiserror::Error;

/// Errors raised by the layout engine.
///
/// Degenerate geometry is never an error; only a malformed size range is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Invalid size range: start_size {start_size} is below min_size {min_size}")]
    InvalidSizeRange { start_size: u32, min_size: u32 },

    #[error("Invalid size step: {0} (must be at least 1)")]
    InvalidSizeStep(u32),
}

/// Application-level error type for planning and writing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
