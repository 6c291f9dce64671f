//! Classifier Slot - process-wide holder of the loaded classifier
//!
//! Readers clone the `Arc` and release the lock immediately. A reload builds
//! the new classifier first, then swaps the reference under a short write
//! lock; requests already holding the old `Arc` finish on it.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::classifier::{LoadedClassifier, ModelClassifier};
use super::inference::InferenceStats;
use crate::logic::error::{DetectionError, ModelLoadError};

/// Model status for operators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub backend: String,
    pub schema_version: Option<u32>,
    pub schema_hash: Option<u32>,
    pub feature_count: usize,
    pub class_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub inference_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f32,
}

#[derive(Debug, Default)]
pub struct ClassifierSlot {
    current: RwLock<Option<Arc<LoadedClassifier>>>,
    last_error: RwLock<Option<String>>,
    stats: Arc<InferenceStats>,
}

impl ClassifierSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a classifier
    pub fn with_classifier(classifier: LoadedClassifier) -> Self {
        let slot = Self::new();
        slot.install(classifier);
        slot
    }

    /// Load a manifest and swap it in
    ///
    /// On failure the previous classifier (if any) stays active and the reason
    /// is kept for `ModelUnavailable` reports.
    pub fn load(&self, path: &Path) -> Result<(), ModelLoadError> {
        tracing::info!(path = %path.display(), "Loading model manifest");

        match LoadedClassifier::from_manifest_path(path) {
            Ok(classifier) => {
                self.install(classifier);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Model load failed");
                *self.last_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the shared reference atomically
    pub fn install(&self, classifier: LoadedClassifier) {
        tracing::info!(
            model = %classifier.name(),
            backend = classifier.backend_name(),
            features = classifier.schema().len(),
            classes = classifier.classes().len(),
            "Classifier loaded"
        );

        let fresh = Arc::new(classifier);
        *self.current.write() = Some(fresh);
        *self.last_error.write() = None;
    }

    /// Unload model
    pub fn unload(&self) {
        *self.current.write() = None;
        *self.last_error.write() = Some("model unloaded".to_string());
        tracing::info!("Classifier unloaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Current classifier, if any
    pub fn current(&self) -> Option<Arc<LoadedClassifier>> {
        self.current.read().clone()
    }

    /// Model classifier bound to the current `Arc`, or `ModelUnavailable`
    pub fn model_classifier(&self) -> Result<ModelClassifier, DetectionError> {
        match self.current() {
            Some(classifier) => Ok(ModelClassifier::new(classifier, self.stats.clone())),
            None => {
                let reason = self
                    .last_error
                    .read()
                    .clone()
                    .unwrap_or_else(|| "no classifier loaded".to_string());
                Err(DetectionError::ModelUnavailable(reason))
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        let current = self.current();
        let stats = self.stats.snapshot();

        EngineStatus {
            model_loaded: current.is_some(),
            model_name: current
                .as_ref()
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| "None".to_string()),
            backend: current
                .as_ref()
                .map(|c| c.backend_name().to_string())
                .unwrap_or_else(|| "none".to_string()),
            schema_version: current.as_ref().map(|c| c.schema().version()),
            schema_hash: current.as_ref().map(|c| c.schema().hash()),
            feature_count: current.as_ref().map(|c| c.schema().len()).unwrap_or(0),
            class_count: current.as_ref().map(|c| c.classes().len()).unwrap_or(0),
            loaded_at: current.as_ref().map(|c| c.loaded_at()),
            last_error: self.last_error.read().clone(),
            inference_count: stats.inference_count,
            failure_count: stats.failure_count,
            avg_latency_ms: stats.avg_latency_ms,
        }
    }
}
