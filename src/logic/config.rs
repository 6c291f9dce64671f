//! Runtime configuration
//!
//! `OperationalConfig` is owned by the settings collaborator and read as a fresh
//! snapshot for every decision. `EngineConfig` is the process configuration,
//! loaded once from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants;
use super::error::{DetectionError, EngineResult};
use super::severity::SeverityPolicy;
use super::simulator::SimulatorConfig;

// ============================================================================
// OPERATIONAL MODE
// ============================================================================

/// Which classifier serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectionMode {
    /// Synthetic decisions from the random simulator
    Simulated,
    /// Decisions from the loaded trained classifier
    Model,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Simulated => "SIMULATED",
            DetectionMode::Model => "MODEL",
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DetectionMode {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SIMULATED" => Ok(DetectionMode::Simulated),
            "MODEL" => Ok(DetectionMode::Model),
            other => Err(DetectionError::ConfigUnavailable(format!(
                "unknown detection mode '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// OPERATIONAL CONFIG (per-request snapshot)
// ============================================================================

/// Snapshot of the settings that drive one decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationalConfig {
    pub mode: DetectionMode,
    /// Informational for now; attacks below it are only logged
    pub confidence_threshold: f32,
}

impl Default for OperationalConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Simulated,
            confidence_threshold: constants::DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl OperationalConfig {
    pub fn new(mode: DetectionMode, confidence_threshold: f32) -> Self {
        Self { mode, confidence_threshold }
    }

    pub fn simulated() -> Self {
        Self::new(DetectionMode::Simulated, constants::DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn model() -> Self {
        Self::new(DetectionMode::Model, constants::DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// Build from the legacy settings row (`test_mode == true` means simulated)
    pub fn from_test_mode(test_mode: bool, confidence_threshold: f32) -> Self {
        let mode = if test_mode { DetectionMode::Simulated } else { DetectionMode::Model };
        Self::new(mode, confidence_threshold)
    }

    /// Reject snapshots the engine cannot act on
    pub fn validate(&self) -> EngineResult<()> {
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(DetectionError::ConfigUnavailable(format!(
                "confidence threshold {} outside [0, 1]",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SETTINGS SOURCE (external collaborator boundary)
// ============================================================================

/// Provider of operational settings
///
/// Implementations return `DetectionError::ConfigUnavailable` when the backing
/// store cannot be reached. The engine never guesses a mode in that case.
pub trait SettingsSource: Send + Sync {
    fn snapshot(&self) -> EngineResult<OperationalConfig>;
}

/// In-process settings store
#[derive(Debug, Default)]
pub struct SharedSettings {
    current: RwLock<OperationalConfig>,
}

impl SharedSettings {
    pub fn new(initial: OperationalConfig) -> Self {
        Self { current: RwLock::new(initial) }
    }

    pub fn set_mode(&self, mode: DetectionMode) {
        self.current.write().mode = mode;
        tracing::info!(%mode, "Detection mode changed");
    }

    pub fn set_confidence_threshold(&self, threshold: f32) -> EngineResult<()> {
        let candidate = OperationalConfig {
            confidence_threshold: threshold,
            ..*self.current.read()
        };
        candidate.validate()?;
        self.current.write().confidence_threshold = threshold;
        Ok(())
    }
}

impl SettingsSource for SharedSettings {
    fn snapshot(&self) -> EngineResult<OperationalConfig> {
        Ok(*self.current.read())
    }
}

// ============================================================================
// ENGINE CONFIG (process-wide)
// ============================================================================

/// Process configuration, loaded once at start-up
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the model manifest (JSON), if any
    pub model_path: Option<PathBuf>,

    /// Settings the in-process store starts with
    pub initial_settings: OperationalConfig,

    /// Random simulator parameters
    pub simulator: SimulatorConfig,

    /// Seed for the simulator RNG (None = OS entropy)
    pub simulator_seed: Option<u64>,

    /// Severity tiers and escalation policy
    pub severity: SeverityPolicy,

    /// Trailing dedup window for alerts
    pub dedup_window: Duration,

    /// Maximum number of alert keys remembered
    pub dedup_capacity: usize,

    /// Directory for the JSONL decision/alert history
    pub history_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            initial_settings: OperationalConfig::default(),
            simulator: SimulatorConfig::default(),
            simulator_seed: None,
            severity: SeverityPolicy::default(),
            dedup_window: Duration::from_secs(constants::DEFAULT_DEDUP_WINDOW_SECS),
            dedup_capacity: constants::DEFAULT_DEDUP_CAPACITY,
            history_dir: PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> EngineResult<Self> {
        let mode = constants::get_mode().parse::<DetectionMode>()?;
        let initial_settings = OperationalConfig::new(mode, constants::get_confidence_threshold());
        initial_settings.validate()?;

        let simulator = SimulatorConfig {
            attack_probability: constants::get_attack_probability(),
            ..SimulatorConfig::default()
        };
        simulator
            .validate()
            .map_err(DetectionError::ConfigUnavailable)?;

        Ok(Self {
            model_path: constants::get_model_path().map(PathBuf::from),
            initial_settings,
            simulator,
            simulator_seed: constants::get_simulator_seed(),
            severity: SeverityPolicy {
                escalate_known_attacks: constants::is_escalation_enabled(),
                ..SeverityPolicy::default()
            },
            dedup_window: Duration::from_secs(constants::get_dedup_window_secs()),
            dedup_capacity: constants::get_dedup_capacity(),
            history_dir: constants::get_history_dir(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!("simulated".parse::<DetectionMode>().unwrap(), DetectionMode::Simulated);
        assert_eq!(" MODEL ".parse::<DetectionMode>().unwrap(), DetectionMode::Model);
        assert!("production".parse::<DetectionMode>().is_err());
    }

    #[test]
    fn test_mode_serde_uppercase() {
        let json = serde_json::to_string(&DetectionMode::Simulated).unwrap();
        assert_eq!(json, "\"SIMULATED\"");
        let mode: DetectionMode = serde_json::from_str("\"MODEL\"").unwrap();
        assert_eq!(mode, DetectionMode::Model);
    }

    #[test]
    fn test_legacy_test_mode() {
        assert_eq!(OperationalConfig::from_test_mode(true, 0.7).mode, DetectionMode::Simulated);
        assert_eq!(OperationalConfig::from_test_mode(false, 0.7).mode, DetectionMode::Model);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(OperationalConfig::new(DetectionMode::Model, 0.5).validate().is_ok());
        let err = OperationalConfig::new(DetectionMode::Model, 1.5).validate().unwrap_err();
        assert_eq!(err.kind(), crate::logic::error::ErrorKind::ConfigUnavailable);
        assert!(OperationalConfig::new(DetectionMode::Model, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_toggles() {
        let settings = SharedSettings::new(OperationalConfig::simulated());
        let snapshot = settings.snapshot().unwrap();

        settings.set_mode(DetectionMode::Model);

        assert_eq!(snapshot.mode, DetectionMode::Simulated);
        assert_eq!(settings.snapshot().unwrap().mode, DetectionMode::Model);
    }

    #[test]
    fn test_set_threshold_rejects_out_of_range() {
        let settings = SharedSettings::default();
        assert!(settings.set_confidence_threshold(-0.1).is_err());
        assert!(settings.set_confidence_threshold(0.9).is_ok());
        assert_eq!(settings.snapshot().unwrap().confidence_threshold, 0.9);
    }
}
