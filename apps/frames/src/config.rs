use std::path::PathBuf;

use anyhow::{Context, Result};

/// Frame generator configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub rows_path: PathBuf,
    pub out_dir: PathBuf,
    pub font_cn: Option<PathBuf>,
    pub font_en: Option<PathBuf>,
    pub font_index_cn: u32,
    pub font_index_en: u32,
    pub template_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            rows_path: require_env(&lookup, "FRAMES_ROWS")?.into(),
            out_dir: require_env(&lookup, "FRAMES_OUT_DIR")?.into(),
            font_cn: optional_path(&lookup, "FRAMES_FONT_CN"),
            font_en: optional_path(&lookup, "FRAMES_FONT_EN"),
            font_index_cn: face_index(&lookup, "FRAMES_FONT_INDEX_CN")?,
            font_index_en: face_index(&lookup, "FRAMES_FONT_INDEX_EN")?,
            template_path: optional_path(&lookup, "FRAMES_TEMPLATE"),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_path<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<PathBuf> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn face_index<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Result<u32> {
    lookup(key)
        .unwrap_or_else(|| "0".to_string())
        .trim()
        .parse::<u32>()
        .with_context(|| format!("{key} must be a non-negative face index"))
}
