use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::config::DetectionMode;
use crate::logic::engine::DecisionResult;
use crate::logic::severity::Severity;

/// Identity of the decision an alert is about (dedup key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRef(String);

impl EventRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for EventRef {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for EventRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for EventRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Only attack decisions produce alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertKind {
    Attack,
}

/// Notification handed to the notification-storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub event_ref: EventRef,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub attack_type: Option<String>,
    pub confidence: f32,
    pub mode: DetectionMode,
    pub created_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn for_decision(result: &DecisionResult, event_ref: EventRef, created_at: DateTime<Utc>) -> Self {
        let attack = result.attack_type.as_deref().unwrap_or("unknown");

        Self {
            id: Uuid::new_v4(),
            event_ref,
            kind: AlertKind::Attack,
            severity: result.severity,
            title: format!("{} attack detected: {}", result.severity, attack),
            message: format!(
                "{} traffic classified with {:.1}% confidence ({} mode)",
                attack,
                result.confidence * 100.0,
                result.mode
            ),
            attack_type: result.attack_type.clone(),
            confidence: result.confidence,
            mode: result.mode,
            created_at,
        }
    }
}
