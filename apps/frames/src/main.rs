mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use frames::batch::{load_rows, run_batch};
use frames::fonts::{FontFace, FontLibrary, FontRole};
use frames::frame::FrameTemplate;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting frames v{}", env!("CARGO_PKG_VERSION"));

    let template = match &config.template_path {
        Some(path) => FrameTemplate::load(path)
            .await
            .with_context(|| format!("Failed to load frame template {}", path.display()))?,
        None => FrameTemplate::default(),
    };
    info!(
        "Frame template: {}x{} canvas",
        template.canvas_width, template.canvas_height
    );

    let mut fonts = FontLibrary::approximate();
    fonts = with_face(fonts, FontRole::Cn, config.font_cn.as_deref(), config.font_index_cn).await?;
    fonts = with_face(fonts, FontRole::En, config.font_en.as_deref(), config.font_index_en).await?;

    let rows = load_rows(&config.rows_path)
        .await
        .with_context(|| format!("Failed to read rows from {}", config.rows_path.display()))?;

    let summary = run_batch(rows, Arc::new(template), Arc::new(fonts), &config.out_dir).await?;
    info!(
        "Wrote {} frame plans to {} ({} truncated)",
        summary.written.len(),
        config.out_dir.display(),
        summary.truncated
    );

    Ok(())
}

/// Loads the configured face for `role`, or keeps the built-in metrics.
async fn with_face(
    fonts: FontLibrary,
    role: FontRole,
    path: Option<&Path>,
    index: u32,
) -> Result<FontLibrary> {
    let Some(path) = path else {
        warn!(
            "No font file for '{role}', using {}",
            fonts.source(role).describe()
        );
        return Ok(fonts);
    };

    let face = FontFace::load(path, index)
        .await
        .with_context(|| format!("Failed to load '{role}' font {}", path.display()))?;
    let fonts = fonts.with_face(role, face);
    info!("Font '{role}': {}", fonts.source(role).describe());
    Ok(fonts)
}
