//! Per-run `summary.txt` report.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

pub const SUMMARY_FILE: &str = "summary.txt";
const PREVIEW_CHARS: usize = 100;

#[derive(Error, Debug)]
#[error("failed to write summary: {0}")]
pub struct SummaryError(#[from] std::io::Error);

/// Renders the report. `processed` is keyed by 1-based line index and only
/// its keys are consulted.
pub fn render_summary<T>(
    lines: &[String],
    processed: &BTreeMap<usize, T>,
    started_at: &DateTime<Local>,
    language: &str,
    voice_id: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Processed at: {}\n",
        started_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Processed lines: {}/{}\n",
        processed.len(),
        lines.len()
    ));
    out.push_str(&format!("Language: {}\n", language));
    out.push_str(&format!("Voice ID: {}\n", voice_id));
    out.push_str("\n--- Lines ---\n");

    for (i, line) in lines.iter().enumerate() {
        let index = i + 1;
        let status = if processed.contains_key(&index) {
            "SUCCESS"
        } else {
            "FAILURE"
        };
        let mut chars = line.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        let ellipsis = if chars.next().is_some() { "..." } else { "" };
        out.push_str(&format!("{}. [{}] {}{}\n", index, status, head, ellipsis));
    }
    out
}

/// Writes `summary.txt` into `output_dir`, replacing any earlier one.
pub fn save_summary<T>(
    output_dir: &Path,
    lines: &[String],
    processed: &BTreeMap<usize, T>,
    started_at: &DateTime<Local>,
    language: &str,
    voice_id: &str,
) -> Result<PathBuf, SummaryError> {
    let path = output_dir.join(SUMMARY_FILE);
    let report = render_summary(lines, processed, started_at, language, voice_id);
    fs::write(&path, report)?;
    info!("Summary saved to '{}'", path.display());
    Ok(path)
}
