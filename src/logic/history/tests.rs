use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;
use tempfile::tempdir;
use uuid::Uuid;

use super::writer::JsonlWriter;
use super::*;
use crate::logic::alert::EventRef;
use crate::logic::config::DetectionMode;
use crate::logic::severity::Severity;
use crate::logic::threat::Label;

fn attack_result() -> DecisionResult {
    DecisionResult {
        id: Uuid::new_v4(),
        label: Label::Attack,
        attack_type: Some("smurf".to_string()),
        confidence: 0.93,
        severity: Severity::Critical,
        mode: DetectionMode::Simulated,
        created_at: Utc::now(),
    }
}

fn jsonl_files(dir: &Path, prefix: &str) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.file_name().unwrap().to_str().unwrap().starts_with(prefix))
        .collect()
}

#[test]
fn test_decision_append_and_read() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let result = attack_result();

    store.record_decision(&result).unwrap();

    let files = jsonl_files(dir.path(), "decisions-");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "jsonl");

    let content = fs::read_to_string(&files[0]).unwrap();
    let read_back: DecisionResult = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(read_back, result);
    assert!(content.contains("\"label\":\"ATTACK\""));
    assert!(content.contains("\"severity\":\"CRITICAL\""));
}

#[test]
fn test_alerts_go_to_their_own_stream() {
    let dir = tempdir().unwrap();
    let store = JsonlStore::new(dir.path());
    let result = attack_result();
    let alert = AlertEvent::for_decision(&result, EventRef::from(result.id), Utc::now());

    persist(&store, &store, &result, Some(&alert));

    assert_eq!(jsonl_files(dir.path(), "decisions-").len(), 1);
    let alerts = jsonl_files(dir.path(), "alerts-");
    assert_eq!(alerts.len(), 1);

    let line = fs::read_to_string(&alerts[0]).unwrap();
    let read_back: AlertEvent = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(read_back.event_ref, EventRef::from(result.id));

    let status = store.status();
    assert_eq!(status.decisions_written, 1);
    assert_eq!(status.alerts_written, 1);
}

#[test]
fn test_small_writes_share_one_file() {
    let dir = tempdir().unwrap();
    let writer = JsonlWriter::new(dir.path(), "decisions");

    writer.append(&attack_result()).unwrap();
    writer.append(&attack_result()).unwrap();

    assert_eq!(jsonl_files(dir.path(), "decisions-").len(), 1);
}

#[test]
fn test_rotation_creates_new_file() {
    let dir = tempdir().unwrap();
    let writer = JsonlWriter::new(dir.path(), "decisions").with_max_size(16);

    for _ in 0..3 {
        writer.append(&attack_result()).unwrap();
    }

    let files = jsonl_files(dir.path(), "decisions-");
    assert_eq!(files.len(), 3);
    for file in files {
        assert_eq!(fs::read_to_string(file).unwrap().lines().count(), 1);
    }
}

#[test]
fn test_new_writer_continues_latest_file() {
    let dir = tempdir().unwrap();
    JsonlWriter::new(dir.path(), "alerts").append(&attack_result()).unwrap();
    JsonlWriter::new(dir.path(), "alerts").append(&attack_result()).unwrap();

    let files = jsonl_files(dir.path(), "alerts-");
    assert_eq!(files.len(), 1);
    assert_eq!(fs::read_to_string(&files[0]).unwrap().lines().count(), 2);
}

struct FailingSink;

impl DecisionSink for FailingSink {
    fn record_decision(&self, _: &DecisionResult) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

impl AlertSink for FailingSink {
    fn record_alert(&self, _: &AlertEvent) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

#[test]
fn test_sink_failures_do_not_propagate() {
    let result = attack_result();
    let alert = AlertEvent::for_decision(&result, result.event_ref(), Utc::now());

    // only logs
    persist(&FailingSink, &FailingSink, &result, Some(&alert));
}
