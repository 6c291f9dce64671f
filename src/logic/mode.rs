//! Mode Selector
//!
//! Picks the classifier for one request from the request's config snapshot.
//! MODEL mode without a loaded classifier is an error, never a quiet fallback
//! to simulation.

use std::sync::Arc;

use super::config::{DetectionMode, OperationalConfig};
use super::error::EngineResult;
use super::model::{ClassifierSlot, ModelClassifier};

/// Classifier resolved for one request
#[derive(Debug, Clone)]
pub enum SelectedClassifier {
    Simulator,
    Model(ModelClassifier),
}

impl SelectedClassifier {
    pub fn mode(&self) -> DetectionMode {
        match self {
            SelectedClassifier::Simulator => DetectionMode::Simulated,
            SelectedClassifier::Model(_) => DetectionMode::Model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModeSelector {
    slot: Arc<ClassifierSlot>,
}

impl ModeSelector {
    pub fn new(slot: Arc<ClassifierSlot>) -> Self {
        Self { slot }
    }

    /// Resolve against the slot as it is right now; nothing is cached
    pub fn select(&self, config: &OperationalConfig) -> EngineResult<SelectedClassifier> {
        match config.mode {
            DetectionMode::Simulated => Ok(SelectedClassifier::Simulator),
            DetectionMode::Model => self.slot.model_classifier().map(SelectedClassifier::Model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::DetectionError;
    use crate::logic::features::FeatureSchema;
    use crate::logic::model::{LinearModel, LoadedClassifier};

    fn tiny_classifier() -> LoadedClassifier {
        let schema = FeatureSchema::new(1, &["flag=S0"]).unwrap();
        let model = LinearModel::new(vec![vec![-1.0], vec![1.0]], vec![0.0, 0.0]).unwrap();
        LoadedClassifier::new("tiny", schema, vec!["normal".into(), "neptune".into()], "normal", Box::new(model))
            .unwrap()
    }

    #[test]
    fn test_simulated_needs_no_model() {
        let selector = ModeSelector::new(Arc::new(ClassifierSlot::new()));
        let selected = selector.select(&OperationalConfig::simulated()).unwrap();
        assert_eq!(selected.mode(), DetectionMode::Simulated);
    }

    #[test]
    fn test_model_mode_without_classifier_is_unavailable() {
        let selector = ModeSelector::new(Arc::new(ClassifierSlot::new()));
        let err = selector.select(&OperationalConfig::model()).unwrap_err();
        assert!(matches!(err, DetectionError::ModelUnavailable(_)));
    }

    #[test]
    fn test_reads_slot_on_every_call() {
        let slot = Arc::new(ClassifierSlot::new());
        let selector = ModeSelector::new(slot.clone());
        assert!(selector.select(&OperationalConfig::model()).is_err());

        slot.install(tiny_classifier());
        let selected = selector.select(&OperationalConfig::model()).unwrap();
        assert_eq!(selected.mode(), DetectionMode::Model);

        slot.unload();
        assert!(selector.select(&OperationalConfig::model()).is_err());
    }
}
