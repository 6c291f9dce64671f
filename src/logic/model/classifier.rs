//! Loaded classifier + Model Classifier
//!
//! `LoadedClassifier` is the read-only shared resource: backend, schema and
//! class labels. `ModelClassifier` turns it into a `Verdict` for one record.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::artifact::{self, BackendSpec, ModelManifest};
use super::inference::{InferenceStats, LinearModel, TrainedModel};
use crate::logic::error::{DetectionError, ModelLoadError};
use crate::logic::features::{normalize, FeatureSchema, FlowFeatureRecord};
use crate::logic::threat::{Label, Verdict};

// ============================================================================
// LOADED CLASSIFIER
// ============================================================================

/// Raw model output for one record
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_index: usize,
    pub probabilities: Vec<f32>,
    pub confidence: f32,
}

pub struct LoadedClassifier {
    name: String,
    schema: FeatureSchema,
    classes: Vec<String>,
    normal_index: usize,
    model: Box<dyn TrainedModel>,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for LoadedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedClassifier")
            .field("name", &self.name)
            .field("backend", &self.model.backend_name())
            .field("schema_version", &self.schema.version())
            .field("features", &self.schema.len())
            .field("classes", &self.classes)
            .finish()
    }
}

impl LoadedClassifier {
    /// Assemble a classifier, checking backend dimensions against schema and classes
    pub fn new(
        name: impl Into<String>,
        schema: FeatureSchema,
        classes: Vec<String>,
        normal_class: &str,
        model: Box<dyn TrainedModel>,
    ) -> Result<Self, ModelLoadError> {
        if classes.is_empty() {
            return Err(ModelLoadError::InvalidArtifact("no class labels".into()));
        }
        for (i, class) in classes.iter().enumerate() {
            if classes[..i].contains(class) {
                return Err(ModelLoadError::InvalidArtifact(format!("duplicate class '{}'", class)));
            }
        }
        let normal_index = classes.iter().position(|c| c == normal_class).ok_or_else(|| {
            ModelLoadError::InvalidArtifact(format!("normal class '{}' not among classes", normal_class))
        })?;

        if model.input_dim() != schema.len() {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "backend expects {} features, schema has {}",
                model.input_dim(),
                schema.len()
            )));
        }
        if model.output_dim() != classes.len() {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "backend produces {} classes, manifest lists {}",
                model.output_dim(),
                classes.len()
            )));
        }

        Ok(Self {
            name: name.into(),
            schema,
            classes,
            normal_index,
            model,
            loaded_at: Utc::now(),
        })
    }

    /// Load from a JSON manifest (and, for ONNX, the graph it points at)
    pub fn from_manifest_path(path: &Path) -> Result<Self, ModelLoadError> {
        let manifest = ModelManifest::from_path(path)?;
        let schema = FeatureSchema::try_from(manifest.schema.clone())?;

        let model: Box<dyn TrainedModel> = match &manifest.backend {
            BackendSpec::Linear { weights, bias } => {
                Box::new(LinearModel::new(weights.clone(), bias.clone())?)
            }
            BackendSpec::Onnx { path: model_path, sha256, probabilities_output } => {
                let resolved = artifact::resolve_relative(path, model_path);
                if let Some(expected) = sha256 {
                    artifact::verify_checksum(&resolved, expected)?;
                }
                let output = probabilities_output
                    .as_deref()
                    .unwrap_or(artifact::DEFAULT_PROBABILITIES_OUTPUT);
                load_onnx_backend(&resolved, output, schema.len(), manifest.classes.len())?
            }
        };

        Self::new(manifest.name, schema, manifest.classes, &manifest.normal_class, model)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn backend_name(&self) -> &'static str {
        self.model.backend_name()
    }

    /// Decoded class label for an index
    pub fn class_name(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn is_normal_class(&self, index: usize) -> bool {
        index == self.normal_index
    }

    /// Align, run the backend, take the arg-max class
    pub fn predict(&self, record: &FlowFeatureRecord) -> Result<Prediction, DetectionError> {
        let vector = normalize(record, &self.schema);
        vector.ensure_layout(&self.schema)?;

        let probabilities = self.model.predict_proba(&vector)?;

        if probabilities.len() != self.classes.len() {
            return Err(DetectionError::InferenceError(format!(
                "backend returned {} probabilities for {} classes",
                probabilities.len(),
                self.classes.len()
            )));
        }
        if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(DetectionError::InferenceError(
                "backend returned an invalid probability".to_string(),
            ));
        }

        // First maximum wins on ties
        let (class_index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        Ok(Prediction {
            class_index,
            probabilities,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

#[cfg(feature = "onnx")]
fn load_onnx_backend(
    path: &Path,
    output: &str,
    input_dim: usize,
    output_dim: usize,
) -> Result<Box<dyn TrainedModel>, ModelLoadError> {
    Ok(Box::new(super::onnx::OnnxModel::load(path, output, input_dim, output_dim)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx_backend(
    path: &Path,
    _output: &str,
    _input_dim: usize,
    _output_dim: usize,
) -> Result<Box<dyn TrainedModel>, ModelLoadError> {
    Err(ModelLoadError::Backend(format!(
        "{} needs the ONNX runtime; rebuild with --features onnx",
        path.display()
    )))
}

// ============================================================================
// MODEL CLASSIFIER
// ============================================================================

/// Classifies records with one specific `LoadedClassifier`
#[derive(Debug, Clone)]
pub struct ModelClassifier {
    classifier: Arc<LoadedClassifier>,
    stats: Arc<InferenceStats>,
}

impl ModelClassifier {
    pub fn new(classifier: Arc<LoadedClassifier>, stats: Arc<InferenceStats>) -> Self {
        Self { classifier, stats }
    }

    pub fn classifier(&self) -> &LoadedClassifier {
        &self.classifier
    }

    /// `label = ATTACK` iff the predicted class is not the normal class
    pub fn classify(&self, record: &FlowFeatureRecord) -> Result<Verdict, DetectionError> {
        let start = Instant::now();

        let prediction = match self.classifier.predict(record) {
            Ok(p) => p,
            Err(e) => {
                self.stats.record_failure();
                tracing::error!(model = %self.classifier.name(), error = %e, "Inference failed");
                return Err(e);
            }
        };

        self.stats.record_success(start.elapsed().as_micros() as u64);

        let label = if self.classifier.is_normal_class(prediction.class_index) {
            Label::Normal
        } else {
            Label::Attack
        };

        let attack_type = match label {
            Label::Attack => self.classifier.class_name(prediction.class_index).map(str::to_string),
            Label::Normal => None,
        };

        Ok(Verdict {
            label,
            attack_type,
            confidence: prediction.confidence,
        })
    }
}
