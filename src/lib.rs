//! ids-core - detection decision engine for network-flow intrusion detection
//!
//! Classifies flow-feature records as normal traffic or an attack, assigns a
//! severity tier and raises deduplicated alerts.

pub mod constants;
pub mod logic;

pub use logic::alert::{AlertEvent, EventRef};
pub use logic::config::{DetectionMode, EngineConfig, OperationalConfig, SettingsSource, SharedSettings};
pub use logic::engine::{DecisionEngine, DecisionResult, DecisionStage, Label};
pub use logic::error::{DetectionError, EngineResult, ErrorKind, ErrorReport, ModelLoadError};
pub use logic::features::FlowFeatureRecord;
pub use logic::severity::{severity_of, Severity};
