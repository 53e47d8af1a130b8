use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::logging::log_export;
use crate::model::{HistoryEntry, PredictionRequest, PredictionResult};

/// Append-only record of successful round-trips for this session.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

/// Point-in-time copy of the log. Serializes as a JSON array of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistorySnapshot {
    pub entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, request: PredictionRequest, result: PredictionResult, timestamp: DateTime<Utc>) {
        self.entries.push(HistoryEntry { timestamp, request, result });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn export(&self) -> HistorySnapshot {
        HistorySnapshot { entries: self.entries.clone() }
    }
}

impl HistorySnapshot {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where an exported snapshot ends up.
pub trait ExportSink {
    fn save(&self, snapshot: &HistorySnapshot, taken_at: DateTime<Utc>) -> Result<PathBuf, ExportError>;
}

/// Writes `f1-predictions-<epoch_ms>.json` into a directory.
#[derive(Debug, Clone)]
pub struct FileExport {
    dir: PathBuf,
}

impl FileExport {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn file_name(taken_at: DateTime<Utc>) -> String {
        format!("f1-predictions-{}.json", taken_at.timestamp_millis())
    }
}

impl ExportSink for FileExport {
    fn save(&self, snapshot: &HistorySnapshot, taken_at: DateTime<Utc>) -> Result<PathBuf, ExportError> {
        let path = self.dir.join(Self::file_name(taken_at));
        let body = snapshot.to_json()?;
        std::fs::write(&path, body).map_err(|source| ExportError::Write {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        log_export(&path.to_string_lossy(), snapshot.entries.len());
        Ok(path)
    }
}
