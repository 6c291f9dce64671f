//! Error handling
//!
//! `DetectionError` is what callers of the engine see. Every variant maps to a
//! stable `ErrorKind` so the caller can tell failures apart without parsing text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EngineResult<T> = Result<T, DetectionError>;

/// Request-level failure of the decision engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DetectionError {
    /// Malformed or missing record fields, rejected before classification
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// MODEL mode selected but no classifier is loaded
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Classifier is loaded but the invocation failed
    #[error("inference error: {0}")]
    InferenceError(String),

    /// Settings collaborator could not provide a usable snapshot
    #[error("configuration unavailable: {0}")]
    ConfigUnavailable(String),
}

/// Stable discriminant of a `DetectionError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    ModelUnavailable,
    InferenceError,
    ConfigUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::ModelUnavailable => "MODEL_UNAVAILABLE",
            ErrorKind::InferenceError => "INFERENCE_ERROR",
            ErrorKind::ConfigUnavailable => "CONFIG_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured, caller-visible form of an error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl DetectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectionError::InvalidInput(_) => ErrorKind::InvalidInput,
            DetectionError::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            DetectionError::InferenceError(_) => ErrorKind::InferenceError,
            DetectionError::ConfigUnavailable(_) => ErrorKind::ConfigUnavailable,
        }
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Failure while loading a model artifact
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("model backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DetectionError::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(DetectionError::ModelUnavailable("x".into()).kind(), ErrorKind::ModelUnavailable);
        assert_eq!(DetectionError::InferenceError("x".into()).kind(), ErrorKind::InferenceError);
        assert_eq!(DetectionError::ConfigUnavailable("x".into()).kind(), ErrorKind::ConfigUnavailable);
    }

    #[test]
    fn test_report_serializes_kind() {
        let report = DetectionError::ModelUnavailable("no classifier loaded".into()).to_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "MODEL_UNAVAILABLE");
        assert!(json["message"].as_str().unwrap().contains("no classifier loaded"));
    }
}
