//! Batch runner: rows file in, one JSON frame plan per row out.
//!
//! Planning is CPU-bound, so rows are planned on the blocking pool with at
//! most one row per core outstanding. Plans are written in input order and the
//! first failing row (in input order) aborts the batch.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::FrameError;
use crate::fonts::FontLibrary;
use crate::frame::{plan_row, CalendarRow, FramePlan, FrameTemplate};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What a finished batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    /// Frames with at least one truncated field.
    pub truncated: usize,
}

/// Encoding of a rows file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    /// Headered CSV, one row per calendar day.
    Csv,
    /// JSON array of row objects.
    Json,
}

impl RowFormat {
    /// `.json` files are JSON; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => RowFormat::Json,
            _ => RowFormat::Csv,
        }
    }
}

/// Reads calendar rows, picking the format from the file extension.
pub async fn load_rows(path: &Path) -> Result<Vec<CalendarRow>, FrameError> {
    let bytes = tokio::fs::read(path).await?;
    let format = RowFormat::from_path(path);
    let rows = parse_rows(&bytes, format)?;
    info!(path = %path.display(), ?format, rows = rows.len(), "Loaded calendar rows");
    Ok(rows)
}

/// Parses rows from memory. A leading UTF-8 byte order mark is ignored.
pub fn parse_rows(bytes: &[u8], format: RowFormat) -> Result<Vec<CalendarRow>, FrameError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match format {
        RowFormat::Json => Ok(serde_json::from_slice(bytes)?),
        RowFormat::Csv => parse_csv(bytes),
    }
}

// Records are paired with the header row as raw strings, so values such as
// "05" are not reinterpreted as numbers. Missing columns read as empty.
fn parse_csv(bytes: &[u8]) -> Result<Vec<CalendarRow>, FrameError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    reader
        .records()
        .map(|record| -> Result<CalendarRow, FrameError> {
            let record = record?;
            let columns: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), Value::String(value.to_string())))
                .collect();
            Ok(serde_json::from_value(Value::Object(columns))?)
        })
        .collect()
}

/// Plans every row and writes `{out_dir}/{date}.json` for each.
pub async fn run_batch(
    rows: Vec<CalendarRow>,
    template: Arc<FrameTemplate>,
    fonts: Arc<FontLibrary>,
    out_dir: &Path,
) -> Result<BatchSummary, FrameError> {
    let window = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4);
    run_batch_windowed(rows, template, fonts, out_dir, window).await
}

/// `window` bounds rows that are planning or waiting to be written. Dropping
/// the task set on an early return cancels every row not yet started.
async fn run_batch_windowed(
    rows: Vec<CalendarRow>,
    template: Arc<FrameTemplate>,
    fonts: Arc<FontLibrary>,
    out_dir: &Path,
    window: usize,
) -> Result<BatchSummary, FrameError> {
    tokio::fs::create_dir_all(out_dir).await?;

    let total = rows.len();
    let window = window.max(1);
    let mut pending = rows.into_iter().enumerate();
    let mut tasks = JoinSet::new();
    let mut ready: BTreeMap<usize, Result<FramePlan, FrameError>> = BTreeMap::new();
    let mut next = 0;
    let mut summary = BatchSummary::default();

    while next < total {
        while tasks.len() + ready.len() < window {
            let Some((i, row)) = pending.next() else {
                break;
            };
            let template = Arc::clone(&template);
            let fonts = Arc::clone(&fonts);
            tasks.spawn_blocking(move || (i, plan_row(&row, i + 1, &template, &*fonts)));
        }

        if !ready.contains_key(&next) {
            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (i, result) = joined.map_err(|e| {
                FrameError::Internal(anyhow::anyhow!("spawn_blocking failed planning a row: {e}"))
            })?;
            ready.insert(i, result);
        }

        while let Some(result) = ready.remove(&next) {
            let plan = result?;
            let path = write_plan(&plan, out_dir).await?;
            next += 1;
            info!("[{}/{}] {}", next, total, plan.file_name());

            if plan.truncated_count() > 0 {
                summary.truncated += 1;
            }
            summary.written.push(path);
        }
    }

    if summary.truncated > 0 {
        warn!(
            frames = summary.truncated,
            "Some frames needed truncation at the minimum size"
        );
    }
    info!("Done.");
    Ok(summary)
}

async fn write_plan(plan: &FramePlan, out_dir: &Path) -> Result<PathBuf, FrameError> {
    let path = out_dir.join(plan.file_name());
    let json = serde_json::to_vec_pretty(plan)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameField;

    fn row(date: &str, main_text: &str) -> CalendarRow {
        CalendarRow {
            date: date.to_string(),
            day: date.rsplit('-').next().unwrap_or_default().to_string(),
            month_en: "April".to_string(),
            main_text: main_text.to_string(),
            ..CalendarRow::default()
        }
    }

    fn shared() -> (Arc<FrameTemplate>, Arc<FontLibrary>) {
        (
            Arc::new(FrameTemplate::default()),
            Arc::new(FontLibrary::approximate()),
        )
    }

    // ── run_batch ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_batch_writes_one_plan_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("frames");
        let (template, fonts) = shared();
        let rows = vec![
            row("2025-04-01", "四月是你的谎言"),
            row("2025-04-02", "April showers bring May flowers"),
        ];

        let summary = run_batch(rows, template, fonts, &out).await.unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.truncated, 0);
        assert_eq!(summary.written[0], out.join("2025-04-01.json"));

        let bytes = tokio::fs::read(out.join("2025-04-02.json")).await.unwrap();
        let plan: FramePlan = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(plan.canvas_width, 1440);
        let main = plan.field(FrameField::MainText).unwrap();
        assert_eq!(main.lines[0].text, "April showers bring May flowers");
    }

    #[tokio::test]
    async fn test_plans_are_written_in_input_order_past_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let (template, fonts) = shared();
        // Alternate heavy and light rows so later rows tend to finish first.
        let rows: Vec<CalendarRow> = (1..=9)
            .map(|day| {
                let text = if day % 2 == 1 {
                    "很长的句子".repeat(300)
                } else {
                    "short".to_string()
                };
                row(&format!("2025-06-0{day}"), &text)
            })
            .collect();

        let summary = run_batch_windowed(rows, template, fonts, dir.path(), 2)
            .await
            .unwrap();

        let expected: Vec<PathBuf> = (1..=9)
            .map(|day| dir.path().join(format!("2025-06-0{day}.json")))
            .collect();
        assert_eq!(summary.written, expected);
        assert_eq!(summary.truncated, 5);
    }

    #[tokio::test]
    async fn test_missing_date_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (template, fonts) = shared();
        let rows = vec![row("2025-04-01", "ok"), row("", "no date")];

        let err = run_batch(rows, template, fonts, dir.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Row 2 missing 'date'"), "got {err}");
        assert!(dir.path().join("2025-04-01.json").exists(), "earlier rows stay written");
    }

    #[tokio::test]
    async fn test_early_failure_stops_before_later_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (template, fonts) = shared();
        let mut rows = vec![row("", "no date")];
        rows.extend((10..=28).map(|day| row(&format!("2025-04-{day}"), "later")));

        let err = run_batch_windowed(rows, template, fonts, dir.path(), 2)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Row 1 missing 'date'"), "got {err}");
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none(), "nothing after row 1 is written");
    }

    #[tokio::test]
    async fn test_truncated_frames_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        let (template, fonts) = shared();
        let rows = vec![row("2025-04-03", &"很长的句子".repeat(500))];

        let summary = run_batch(rows, template, fonts, dir.path()).await.unwrap();
        assert_eq!(summary.truncated, 1);
    }

    #[tokio::test]
    async fn test_empty_batch_still_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let (template, fonts) = shared();

        let summary = run_batch(Vec::new(), template, fonts, &out).await.unwrap();
        assert!(summary.written.is_empty());
        assert!(out.is_dir());
    }

    // ── load_rows ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(RowFormat::from_path(Path::new("rows.json")), RowFormat::Json);
        assert_eq!(RowFormat::from_path(Path::new("ROWS.JSON")), RowFormat::Json);
        assert_eq!(RowFormat::from_path(Path::new("calendar.csv")), RowFormat::Csv);
        assert_eq!(RowFormat::from_path(Path::new("calendar")), RowFormat::Csv);
    }

    #[tokio::test]
    async fn test_load_rows_reads_bom_prefixed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.csv");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(
            "date,day,month_en,main_text\n\
             2025-05-01,01,May,\"劳动节快乐, 五一\"\n\
             2025-05-02,02,May,\n"
                .as_bytes(),
        );
        tokio::fs::write(&path, bytes).await.unwrap();

        let rows = load_rows(&path).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-05-01", "BOM must not leak into the first header");
        assert_eq!(rows[0].day, "01", "values stay verbatim text");
        assert_eq!(rows[0].main_text, "劳动节快乐, 五一");
        assert_eq!(rows[0].lunar, "", "missing column reads as empty");
        assert_eq!(rows[1].main_text, "");
    }

    #[test]
    fn test_csv_short_rows_and_extra_columns_are_tolerated() {
        let csv = b"date,bg,weekday_cn\n2025-05-03,bg.png,\xE6\x98\x9F\xE6\x9C\x9F\xE5\x85\xAD\n2025-05-04\n";
        let rows = parse_rows(csv, RowFormat::Csv).unwrap();
        assert_eq!(rows[0].weekday_cn, "星期六");
        assert_eq!(rows[1].date, "2025-05-04");
        assert_eq!(rows[1].weekday_cn, "");
    }

    #[tokio::test]
    async fn test_load_rows_reads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(
            &path,
            r#"[{"date": "2025-05-01", "day": 1, "main_text": "劳动节快乐"}, {"date": "2025-05-02"}]"#,
        )
        .await
        .unwrap();

        let rows = load_rows(&path).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, "1");
        assert_eq!(rows[1].main_text, "");
    }

    #[tokio::test]
    async fn test_load_rows_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        tokio::fs::write(&path, r#"{"date": "2025-05-01"}"#).await.unwrap();

        assert!(matches!(load_rows(&path).await, Err(FrameError::Json(_))));
    }
}
