//! ONNX Runtime backend
//!
//! Expects a classifier graph taking a `[1, n_features]` f32 tensor and
//! exposing the class probabilities as a plain float tensor (for skl2onnx,
//! export with `zipmap=False`).

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::TrainedModel;
use crate::logic::error::{DetectionError, ModelLoadError};
use crate::logic::features::AlignedFeatureVector;

pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
    input_dim: usize,
    output_dim: usize,
}

impl OnnxModel {
    /// Load ONNX model from file
    pub fn load(
        model_path: &Path,
        probabilities_output: &str,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Self, ModelLoadError> {
        tracing::info!(path = %model_path.display(), "Loading ONNX model");

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Backend(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Backend(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::Backend(format!("Failed to load model: {}", e)))?;

        let has_output = session.outputs.iter().any(|o| o.name == probabilities_output);
        if !has_output {
            return Err(ModelLoadError::InvalidArtifact(format!(
                "ONNX graph has no output named '{}'",
                probabilities_output
            )));
        }

        Ok(Self {
            session: Mutex::new(session),
            output_name: probabilities_output.to_string(),
            input_dim,
            output_dim,
        })
    }
}

impl TrainedModel for OnnxModel {
    fn predict_proba(&self, input: &AlignedFeatureVector) -> Result<Vec<f32>, DetectionError> {
        if input.len() != self.input_dim {
            return Err(DetectionError::InferenceError(format!(
                "shape mismatch: model expects {} features, got {}",
                self.input_dim,
                input.len()
            )));
        }

        let input_array = Array2::<f32>::from_shape_vec((1, self.input_dim), input.values.clone())
            .map_err(|e| DetectionError::InferenceError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| DetectionError::InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| DetectionError::InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| DetectionError::InferenceError("No probabilities output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectionError::InferenceError(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn output_dim(&self) -> usize {
        self.output_dim
    }

    fn backend_name(&self) -> &'static str {
        "onnx"
    }
}
