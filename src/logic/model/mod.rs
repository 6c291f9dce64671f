//! Model Module - Trained Classifier Inference
//!
//! Separates the trained-model path from the rest of the engine.
//! Easy to swap backends or reload a model without touching callers.

pub mod artifact;
pub mod inference;
pub mod classifier;
pub mod slot;

#[cfg(feature = "onnx")]
pub mod onnx;


// Re-export common types
pub use artifact::{BackendSpec, ModelManifest};
pub use inference::{InferenceStats, InferenceStatsSnapshot, LinearModel, TrainedModel};
pub use classifier::{LoadedClassifier, ModelClassifier, Prediction};
pub use slot::{ClassifierSlot, EngineStatus};
