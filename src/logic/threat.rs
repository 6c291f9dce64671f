//! Threat Types
//!
//! Raw classifier outcome shared by the model classifier and the simulator.
//! No logic here, only data structures.

use serde::{Deserialize, Serialize};

/// Binary decision label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Normal,
    Attack,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "NORMAL",
            Label::Attack => "ATTACK",
        }
    }

    pub fn is_attack(&self) -> bool {
        matches!(self, Label::Attack)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `(label, attack_type, confidence)` before severity is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Present only when `label == Attack`
    pub attack_type: Option<String>,
    /// Probability of the chosen class, in [0, 1]
    pub confidence: f32,
}

impl Verdict {
    pub fn normal(confidence: f32) -> Self {
        Self {
            label: Label::Normal,
            attack_type: None,
            confidence,
        }
    }

    pub fn attack(attack_type: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: Label::Attack,
            attack_type: Some(attack_type.into()),
            confidence,
        }
    }
}
