//! Model Artifact - manifest written next to a trained classifier
//!
//! The manifest pins the feature schema and class labels the model was fit
//! with, and says which backend evaluates it.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::DEFAULT_NORMAL_CLASS;
use crate::logic::error::ModelLoadError;
use crate::logic::features::SchemaSpec;

/// Default ONNX output carrying the class probabilities (skl2onnx naming)
pub const DEFAULT_PROBABILITIES_OUTPUT: &str = "probabilities";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Human-readable model name
    pub name: String,

    /// Ordered trained feature columns
    pub schema: SchemaSpec,

    /// Decoded class labels, by class index
    pub classes: Vec<String>,

    /// Which class means benign traffic
    #[serde(default = "default_normal_class")]
    pub normal_class: String,

    pub backend: BackendSpec,
}

fn default_normal_class() -> String {
    DEFAULT_NORMAL_CLASS.to_string()
}

/// How the model is evaluated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendSpec {
    /// Multinomial linear model: softmax(W·x + b)
    Linear {
        /// `classes × columns`
        weights: Vec<Vec<f32>>,
        /// One per class
        bias: Vec<f32>,
    },

    /// ONNX graph exported with probabilities as a plain float tensor
    Onnx {
        /// Relative paths resolve against the manifest directory
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
        #[serde(default)]
        probabilities_output: Option<String>,
    },
}

impl BackendSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendSpec::Linear { .. } => "linear",
            BackendSpec::Onnx { .. } => "onnx",
        }
    }
}

impl ModelManifest {
    /// Read and parse a manifest file
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Resolve a backend file path against the manifest location
pub fn resolve_relative(manifest_path: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    manifest_path
        .parent()
        .map(|dir| dir.join(target))
        .unwrap_or_else(|| target.to_path_buf())
}

/// SHA-256 of a file, lowercase hex
pub fn calculate_file_hash(path: &Path) -> Result<String, ModelLoadError> {
    let mut file = fs::File::open(path)?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare a file against an expected checksum
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), ModelLoadError> {
    let actual = calculate_file_hash(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ModelLoadError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_parse_linear_manifest() {
        let json = r#"{
            "name": "tiny",
            "schema": { "version": 1, "columns": ["duration", "flag=S0"] },
            "classes": ["normal", "neptune"],
            "backend": { "type": "linear", "weights": [[0.0, -1.0], [0.0, 1.0]], "bias": [0.0, 0.0] }
        }"#;
        let manifest: ModelManifest = serde_json::from_str(json).unwrap();

        assert_eq!(manifest.normal_class, "normal");
        assert_eq!(manifest.backend.kind(), "linear");
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempdir().unwrap();
        let result = ModelManifest::from_path(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ModelLoadError::NotFound(_))));
    }

    #[test]
    fn test_resolve_relative() {
        let manifest = Path::new("/models/ids/manifest.json");
        assert_eq!(
            resolve_relative(manifest, Path::new("ids_model.onnx")),
            PathBuf::from("/models/ids/ids_model.onnx")
        );
        assert_eq!(
            resolve_relative(manifest, Path::new("/abs/model.onnx")),
            PathBuf::from("/abs/model.onnx")
        );
    }

    #[test]
    fn test_checksum_verification() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        // sha256("abc")
        let expected = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(verify_checksum(&path, expected).is_ok());
        assert!(verify_checksum(&path, &expected.to_uppercase()).is_ok());

        let err = verify_checksum(&path, "00").unwrap_err();
        assert!(matches!(err, ModelLoadError::ChecksumMismatch { .. }));
    }
}
