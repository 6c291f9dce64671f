//! Severity Classifier
//!
//! Maps a confidence score to an ordinal severity tier.
//! Tier bounds are configuration defaults, not protocol constants.

use serde::{Deserialize, Serialize};

// ============================================================================
// SEVERITY
// ============================================================================

/// Ordinal risk tier, ordered LOW < MEDIUM < HIGH < CRITICAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// One tier up, saturating at CRITICAL
    pub fn bump(self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// At or above this confidence = CRITICAL
pub const CRITICAL_THRESHOLD: f32 = 0.90;

/// At or above this confidence = HIGH
pub const HIGH_THRESHOLD: f32 = 0.75;

/// At or above this confidence = MEDIUM
pub const MEDIUM_THRESHOLD: f32 = 0.50;

/// Lower bounds of each tier (closed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub critical: f32,
    pub high: f32,
    pub medium: f32,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: CRITICAL_THRESHOLD,
            high: HIGH_THRESHOLD,
            medium: MEDIUM_THRESHOLD,
        }
    }
}

impl SeverityThresholds {
    /// Evaluated top-down, first match wins; boundaries belong to the higher tier
    pub fn classify(&self, confidence: f32) -> Severity {
        if confidence >= self.critical {
            Severity::Critical
        } else if confidence >= self.high {
            Severity::High
        } else if confidence >= self.medium {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Severity with the default tier bounds
pub fn severity_of(confidence: f32) -> Severity {
    SeverityThresholds::default().classify(confidence)
}

// ============================================================================
// ATTACK-TYPE ESCALATION
// ============================================================================

/// Denial-of-service attacks, escalated one tier at any severity
pub const CRITICAL_ATTACKS: &[&str] = &["neptune", "smurf", "pod", "teardrop", "land"];

/// Probe / high-risk attacks, escalated one tier up to HIGH
pub const HIGH_RISK_ATTACKS: &[&str] = &["portsweep", "ipsweep", "satan", "nmap", "back"];

/// Severity tiers plus optional escalation for known-dangerous attack types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityPolicy {
    pub thresholds: SeverityThresholds,
    pub escalate_known_attacks: bool,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            thresholds: SeverityThresholds::default(),
            escalate_known_attacks: false,
        }
    }
}

impl SeverityPolicy {
    /// Severity for a decision; `attack_type` is `None` for normal traffic
    pub fn assess(&self, confidence: f32, attack_type: Option<&str>) -> Severity {
        let base = self.thresholds.classify(confidence);
        match attack_type {
            Some(name) if self.escalate_known_attacks => escalate(base, name),
            _ => base,
        }
    }
}

/// Bump severity for attack names in the escalation lists
pub fn escalate(severity: Severity, attack_type: &str) -> Severity {
    let name = attack_type.to_ascii_lowercase();

    if CRITICAL_ATTACKS.contains(&name.as_str()) {
        severity.bump()
    } else if HIGH_RISK_ATTACKS.contains(&name.as_str()) {
        match severity {
            Severity::Low | Severity::Medium => severity.bump(),
            other => other,
        }
    } else {
        severity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_higher_tier() {
        assert_eq!(severity_of(0.90), Severity::Critical);
        assert_eq!(severity_of(0.8999), Severity::High);
        assert_eq!(severity_of(0.75), Severity::High);
        assert_eq!(severity_of(0.5), Severity::Medium);
        assert_eq!(severity_of(0.4999), Severity::Low);
    }

    #[test]
    fn test_total_over_unit_interval() {
        assert_eq!(severity_of(0.0), Severity::Low);
        assert_eq!(severity_of(1.0), Severity::Critical);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut previous = severity_of(0.0);
        for step in 0..=10_000 {
            let c = step as f32 / 10_000.0;
            let current = severity_of(c);
            assert!(current >= previous, "severity dropped at {}", c);
            previous = current;
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SeverityThresholds { critical: 0.95, high: 0.8, medium: 0.6 };
        assert_eq!(thresholds.classify(0.92), Severity::High);
        assert_eq!(thresholds.classify(0.55), Severity::Low);
    }

    #[test]
    fn test_escalation_off_by_default() {
        let policy = SeverityPolicy::default();
        assert_eq!(policy.assess(0.80, Some("neptune")), Severity::High);
    }

    #[test]
    fn test_escalation_for_dos_attacks() {
        let policy = SeverityPolicy { escalate_known_attacks: true, ..Default::default() };
        assert_eq!(policy.assess(0.80, Some("neptune")), Severity::Critical);
        assert_eq!(policy.assess(0.60, Some("Smurf")), Severity::High);
        assert_eq!(policy.assess(0.20, Some("pod")), Severity::Medium);
    }

    #[test]
    fn test_escalation_for_probe_attacks_caps_at_high() {
        let policy = SeverityPolicy { escalate_known_attacks: true, ..Default::default() };
        assert_eq!(policy.assess(0.60, Some("nmap")), Severity::High);
        assert_eq!(policy.assess(0.80, Some("satan")), Severity::High);
        assert_eq!(policy.assess(0.30, Some("ipsweep")), Severity::Medium);
    }

    #[test]
    fn test_escalation_ignores_normal_and_unknown() {
        let policy = SeverityPolicy { escalate_known_attacks: true, ..Default::default() };
        assert_eq!(policy.assess(0.30, None), Severity::Low);
        assert_eq!(policy.assess(0.80, Some("warezclient")), Severity::High);
    }
}
