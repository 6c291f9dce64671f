use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::alert::EventRef;
use crate::logic::config::DetectionMode;
use crate::logic::severity::Severity;
use crate::logic::threat::{Label, Verdict};

/// Outcome of one classification, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub id: Uuid,
    pub label: Label,
    pub attack_type: Option<String>,
    pub confidence: f32,
    pub severity: Severity,
    pub mode: DetectionMode,
    pub created_at: DateTime<Utc>,
}

impl DecisionResult {
    pub(crate) fn from_verdict(id: Uuid, verdict: Verdict, severity: Severity, mode: DetectionMode) -> Self {
        Self {
            id,
            label: verdict.label,
            attack_type: verdict.attack_type,
            confidence: verdict.confidence,
            severity,
            mode,
            created_at: Utc::now(),
        }
    }

    pub fn is_attack(&self) -> bool {
        self.label.is_attack()
    }

    /// Default dedup key: this decision's own id
    pub fn event_ref(&self) -> EventRef {
        EventRef::from(self.id)
    }
}

/// Per-request states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStage {
    Received,
    ModeResolved,
    /// Model mode only
    FeaturesPrepared,
    Classified,
    SeverityAssigned,
    ResultReady,
    AlertEmitted,
    AlertSuppressed,
    NoAlert,
}

impl DecisionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStage::Received => "RECEIVED",
            DecisionStage::ModeResolved => "MODE_RESOLVED",
            DecisionStage::FeaturesPrepared => "FEATURES_PREPARED",
            DecisionStage::Classified => "CLASSIFIED",
            DecisionStage::SeverityAssigned => "SEVERITY_ASSIGNED",
            DecisionStage::ResultReady => "RESULT_READY",
            DecisionStage::AlertEmitted => "ALERT_EMITTED",
            DecisionStage::AlertSuppressed => "ALERT_SUPPRESSED",
            DecisionStage::NoAlert => "NO_ALERT",
        }
    }
}

impl std::fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
