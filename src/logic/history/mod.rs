//! History Module - decision and alert persistence
//!
//! The persistence collaborator sits behind `DecisionSink` / `AlertSink`.
//! `JsonlStore` is the shipped implementation: one rotating JSONL stream for
//! decisions and one for alerts.

pub mod writer;

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::alert::AlertEvent;
use crate::logic::engine::DecisionResult;
pub use writer::JsonlWriter;

pub trait DecisionSink: Send + Sync {
    fn record_decision(&self, result: &DecisionResult) -> io::Result<()>;
}

pub trait AlertSink: Send + Sync {
    fn record_alert(&self, alert: &AlertEvent) -> io::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStatus {
    pub directory: PathBuf,
    pub decision_files: usize,
    pub alert_files: usize,
    pub total_size_mb: f32,
    pub current_decision_file: String,
    pub decisions_written: u64,
    pub alerts_written: u64,
}

#[derive(Debug)]
pub struct JsonlStore {
    base_dir: PathBuf,
    decisions: JsonlWriter,
    alerts: JsonlWriter,
    decisions_written: AtomicU64,
    alerts_written: AtomicU64,
}

impl JsonlStore {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            decisions: JsonlWriter::new(base_dir, "decisions"),
            alerts: JsonlWriter::new(base_dir, "alerts"),
            decisions_written: AtomicU64::new(0),
            alerts_written: AtomicU64::new(0),
        }
    }

    /// Rotate both streams at `max_size` bytes
    pub fn with_max_file_size(self, max_size: u64) -> Self {
        Self {
            decisions: self.decisions.with_max_size(max_size),
            alerts: self.alerts.with_max_size(max_size),
            ..self
        }
    }

    pub fn status(&self) -> HistoryStatus {
        let (decision_files, decision_mb, current) = self
            .decisions
            .stats()
            .unwrap_or((0, 0.0, "Not initialized".to_string()));
        let (alert_files, alert_mb, _) = self.alerts.stats().unwrap_or((0, 0.0, String::new()));

        HistoryStatus {
            directory: self.base_dir.clone(),
            decision_files,
            alert_files,
            total_size_mb: decision_mb + alert_mb,
            current_decision_file: current,
            decisions_written: self.decisions_written.load(Ordering::Relaxed),
            alerts_written: self.alerts_written.load(Ordering::Relaxed),
        }
    }
}

impl DecisionSink for JsonlStore {
    fn record_decision(&self, result: &DecisionResult) -> io::Result<()> {
        self.decisions.append(result)?;
        self.decisions_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl AlertSink for JsonlStore {
    fn record_alert(&self, alert: &AlertEvent) -> io::Result<()> {
        self.alerts.append(alert)?;
        self.alerts_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Hand a decision (and its alert, if any) to the sinks; failures are logged only
pub fn persist(
    decisions: &dyn DecisionSink,
    alerts: &dyn AlertSink,
    result: &DecisionResult,
    alert: Option<&AlertEvent>,
) {
    if let Err(e) = decisions.record_decision(result) {
        tracing::error!(decision_id = %result.id, error = %e, "Failed to record decision");
    }
    if let Some(alert) = alert {
        if let Err(e) = alerts.record_alert(alert) {
            tracing::error!(alert_id = %alert.id, error = %e, "Failed to record alert");
        }
    }
}
