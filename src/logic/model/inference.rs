//! Inference backends
//!
//! A backend only maps an aligned vector to a class-probability distribution.
//! Schema alignment, decoding and labelling live in `LoadedClassifier`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::error::{DetectionError, ModelLoadError};
use crate::logic::features::AlignedFeatureVector;

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// Trait for inference backends (linear, ONNX, ...)
pub trait TrainedModel: Send + Sync {
    /// Probability per class, in class-index order
    fn predict_proba(&self, input: &AlignedFeatureVector) -> Result<Vec<f32>, DetectionError>;

    /// Expected input width
    fn input_dim(&self) -> usize;

    /// Number of classes produced
    fn output_dim(&self) -> usize;

    fn backend_name(&self) -> &'static str;
}

// ============================================================================
// LINEAR BACKEND
// ============================================================================

/// Multinomial linear classifier: softmax(W·x + b)
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    input_dim: usize,
}

impl LinearModel {
    pub fn new(weights: Vec<Vec<f32>>, bias: Vec<f32>) -> Result<Self, ModelLoadError> {
        if weights.is_empty() {
            return Err(ModelLoadError::InvalidArtifact("linear model has no classes".into()));
        }
        if weights.len() != bias.len() {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "{} weight rows but {} bias terms",
                weights.len(),
                bias.len()
            )));
        }

        let input_dim = weights[0].len();
        if let Some(row) = weights.iter().position(|r| r.len() != input_dim) {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "weight row {} has {} columns, expected {}",
                row,
                weights[row].len(),
                input_dim
            )));
        }

        let all_finite = weights.iter().flatten().chain(bias.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelLoadError::InvalidArtifact("non-finite coefficient".into()));
        }

        Ok(Self { weights, bias, input_dim })
    }
}

impl TrainedModel for LinearModel {
    fn predict_proba(&self, input: &AlignedFeatureVector) -> Result<Vec<f32>, DetectionError> {
        if input.len() != self.input_dim {
            return Err(DetectionError::InferenceError(format!(
                "shape mismatch: model expects {} features, got {}",
                self.input_dim,
                input.len()
            )));
        }

        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(input.as_slice()).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();

        Ok(softmax(&logits))
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.weights.len()
    }

    fn backend_name(&self) -> &'static str {
        "linear"
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ============================================================================
// INFERENCE STATS
// ============================================================================

/// Latency / count tracking shared by all model inferences
#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    failure_count: AtomicU64,
}

/// Snapshot of `InferenceStats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceStatsSnapshot {
    pub inference_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f32,
}

impl InferenceStats {
    pub fn record_success(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> InferenceStatsSnapshot {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        InferenceStatsSnapshot {
            inference_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}
