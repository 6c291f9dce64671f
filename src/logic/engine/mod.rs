//! Decision Engine - request orchestration
//!
//! RECEIVED -> MODE_RESOLVED -> [FEATURES_PREPARED] -> CLASSIFIED
//!   -> SEVERITY_ASSIGNED -> RESULT_READY -> ALERT_EMITTED | ALERT_SUPPRESSED | NO_ALERT
//!
//! Any failure ends the request with an error; no partial results, no retries.
//! Config arrives per call, so a mode toggle never affects a request in flight.

pub mod types;


pub use types::{DecisionResult, DecisionStage};
pub use crate::logic::threat::Label;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::logic::alert::{AlertDeduplicator, AlertEvent, EventRef};
use crate::logic::config::{EngineConfig, OperationalConfig, SettingsSource};
use crate::logic::error::{DetectionError, EngineResult, ModelLoadError};
use crate::logic::features::FlowFeatureRecord;
use crate::logic::model::{ClassifierSlot, EngineStatus};
use crate::logic::mode::{ModeSelector, SelectedClassifier};
use crate::logic::severity::SeverityPolicy;
use crate::logic::simulator::{DecisionRng, RandomSimulator, SeededRng};
use crate::constants;

pub struct DecisionEngine {
    slot: Arc<ClassifierSlot>,
    selector: ModeSelector,
    simulator: RandomSimulator,
    rng: Mutex<Box<dyn DecisionRng>>,
    severity: SeverityPolicy,
    dedup: Mutex<AlertDeduplicator>,
}

impl DecisionEngine {
    /// Engine with default policies and an empty classifier slot
    pub fn new(simulator: RandomSimulator, rng: Box<dyn DecisionRng>) -> Self {
        let slot = Arc::new(ClassifierSlot::new());
        Self {
            selector: ModeSelector::new(slot.clone()),
            slot,
            simulator,
            rng: Mutex::new(rng),
            severity: SeverityPolicy::default(),
            dedup: Mutex::new(AlertDeduplicator::new(
                Duration::from_secs(constants::DEFAULT_DEDUP_WINDOW_SECS),
                constants::DEFAULT_DEDUP_CAPACITY,
            )),
        }
    }

    /// Share an existing classifier slot
    pub fn with_slot(mut self, slot: Arc<ClassifierSlot>) -> Self {
        self.selector = ModeSelector::new(slot.clone());
        self.slot = slot;
        self
    }

    pub fn with_severity_policy(mut self, policy: SeverityPolicy) -> Self {
        self.severity = policy;
        self
    }

    pub fn with_dedup(mut self, window: Duration, capacity: usize) -> Self {
        self.dedup = Mutex::new(AlertDeduplicator::new(window, capacity));
        self
    }

    /// Build from process config; a model that fails to load leaves MODEL mode unavailable
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let simulator =
            RandomSimulator::new(config.simulator.clone()).map_err(DetectionError::ConfigUnavailable)?;

        let rng: Box<dyn DecisionRng> = match config.simulator_seed {
            Some(seed) => Box::new(SeededRng::from_seed(seed)),
            None => Box::new(SeededRng::from_entropy()),
        };

        let engine = Self::new(simulator, rng)
            .with_severity_policy(config.severity)
            .with_dedup(config.dedup_window, config.dedup_capacity);

        if let Some(path) = &config.model_path {
            if engine.load_model(path).is_err() {
                tracing::warn!("Continuing without a model; MODEL mode will report it unavailable");
            }
        }

        tracing::info!(
            mode = %config.initial_settings.mode,
            model_loaded = engine.slot.is_loaded(),
            escalation = config.severity.escalate_known_attacks,
            dedup_window_secs = config.dedup_window.as_secs(),
            "Decision engine started"
        );

        Ok(engine)
    }

    // ------------------------------------------------------------------------
    // DECISIONS
    // ------------------------------------------------------------------------

    /// Classify one record under the given config snapshot
    pub fn decide(&self, record: &FlowFeatureRecord, config: &OperationalConfig) -> EngineResult<DecisionResult> {
        let id = Uuid::new_v4();
        trace_stage(id, DecisionStage::Received);

        self.run(id, record, config).map_err(|e| {
            tracing::debug!(decision_id = %id, kind = %e.kind(), error = %e, "Decision failed");
            e
        })
    }

    /// Take a fresh snapshot from `source`, then decide
    pub fn decide_with(&self, record: &FlowFeatureRecord, source: &dyn SettingsSource) -> EngineResult<DecisionResult> {
        let config = source.snapshot()?;
        self.decide(record, &config)
    }

    fn run(&self, id: Uuid, record: &FlowFeatureRecord, config: &OperationalConfig) -> EngineResult<DecisionResult> {
        record.validate()?;
        config.validate()?;

        let selected = self.selector.select(config)?;
        let mode = selected.mode();
        trace_stage(id, DecisionStage::ModeResolved);

        let verdict = match selected {
            SelectedClassifier::Simulator => {
                let mut rng = self.rng.lock();
                self.simulator.simulate(rng.as_mut())
            }
            SelectedClassifier::Model(model) => {
                trace_stage(id, DecisionStage::FeaturesPrepared);
                model.classify(record)?
            }
        };
        trace_stage(id, DecisionStage::Classified);

        let severity = self.severity.assess(verdict.confidence, verdict.attack_type.as_deref());
        trace_stage(id, DecisionStage::SeverityAssigned);

        if verdict.label.is_attack() && verdict.confidence < config.confidence_threshold {
            tracing::warn!(
                decision_id = %id,
                confidence = verdict.confidence,
                threshold = config.confidence_threshold,
                "Attack decision below confidence threshold"
            );
        }

        let result = DecisionResult::from_verdict(id, verdict, severity, mode);
        trace_stage(id, DecisionStage::ResultReady);

        tracing::debug!(
            decision_id = %id,
            label = %result.label,
            attack_type = ?result.attack_type,
            confidence = result.confidence,
            severity = %result.severity,
            mode = %result.mode,
            "Decision ready"
        );

        Ok(result)
    }

    // ------------------------------------------------------------------------
    // ALERTS
    // ------------------------------------------------------------------------

    /// Alert for an attack result unless one for `event_ref` went out within the window
    pub fn maybe_alert(&self, result: &DecisionResult, event_ref: &EventRef) -> Option<AlertEvent> {
        self.maybe_alert_at(result, event_ref, Utc::now())
    }

    /// `maybe_alert` with an explicit clock
    pub fn maybe_alert_at(
        &self,
        result: &DecisionResult,
        event_ref: &EventRef,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        if !result.is_attack() {
            trace_stage(result.id, DecisionStage::NoAlert);
            return None;
        }

        // check and record under one lock
        let approved = self.dedup.lock().should_alert(event_ref, result.severity, now);

        if approved {
            trace_stage(result.id, DecisionStage::AlertEmitted);
            Some(AlertEvent::for_decision(result, event_ref.clone(), now))
        } else {
            trace_stage(result.id, DecisionStage::AlertSuppressed);
            None
        }
    }

    // ------------------------------------------------------------------------
    // MODEL LIFECYCLE
    // ------------------------------------------------------------------------

    pub fn load_model(&self, path: &Path) -> Result<(), ModelLoadError> {
        self.slot.load(path)
    }

    /// Same as `load_model`; requests in flight finish on the old classifier
    pub fn reload_model(&self, path: &Path) -> Result<(), ModelLoadError> {
        tracing::info!(path = %path.display(), "Reloading model");
        self.slot.load(path)
    }

    pub fn unload_model(&self) {
        self.slot.unload();
    }

    pub fn status(&self) -> EngineStatus {
        self.slot.status()
    }

    pub fn slot(&self) -> &Arc<ClassifierSlot> {
        &self.slot
    }
}

fn trace_stage(id: Uuid, stage: DecisionStage) {
    tracing::trace!(decision_id = %id, stage = %stage, "Decision stage");
}
