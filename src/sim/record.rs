/// Solve records: one JSON file per finished puzzle.
///
/// Written when the VIP escapes or the player gives up. The record holds
/// the puzzle text and the full audit trail, replayed once at creation so
/// the record says whether the trail backs up its status.
///
/// ## File name:
///   `<puzzle-slug>-<finished_at>.json` inside the configured solves
///   directory, created on demand.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::log::AuditLog;
use super::replay;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Completed,
    GaveUp,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SolveRecord {
    pub puzzle: String,
    pub status: SolveStatus,
    /// The puzzle text the audit was recorded against.
    pub puzzle_file: String,
    /// Audit trail, one record per line.
    pub log_file: String,
    /// Did replaying `log_file` on `puzzle_file` agree with `status`?
    pub valid: bool,
    /// Unix milliseconds.
    pub finished_at: u64,
}

impl SolveRecord {
    pub fn new(puzzle: String, status: SolveStatus, puzzle_file: String, log_file: String, finished_at: u64) -> Self {
        let valid = log_is_valid(&puzzle_file, &log_file, status);
        if !valid {
            warn!(%puzzle, ?status, "audit trail does not replay to its status");
        }
        SolveRecord { puzzle, status, puzzle_file, log_file, valid, finished_at }
    }
}

/// A completed trail must replay to a win, a given-up one must replay
/// cleanly without winning.
pub fn log_is_valid(puzzle_file: &str, log_file: &str, status: SolveStatus) -> bool {
    let Ok(audit) = AuditLog::parse(log_file) else { return false };
    match replay::replay(puzzle_file, &audit) {
        Ok(report) => report.solved == (status == SolveStatus::Completed),
        Err(_) => false,
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("solve record I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("solve record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> RecordError + '_ {
    move |source| RecordError::Io { path: path.to_path_buf(), source }
}

/// Lowercase alphanumerics, everything else collapsed to single dashes.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() { "puzzle".to_string() } else { trimmed.to_string() }
}

pub fn record_path(dir: &Path, record: &SolveRecord) -> PathBuf {
    dir.join(format!("{}-{}.json", slug(&record.puzzle), record.finished_at))
}

/// Write a record, creating `dir` if needed. Returns the file path.
pub fn write_record(dir: &Path, record: &SolveRecord) -> Result<PathBuf, RecordError> {
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = record_path(dir, record);
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(&path, json).map_err(io_err(&path))?;
    info!(path = %path.display(), status = ?record.status, "solve record written");
    Ok(path)
}

pub fn read_record(path: &Path) -> Result<SolveRecord, RecordError> {
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    Ok(serde_json::from_str(&text)?)
}
