//! Feature Schema - the ordered column layout a classifier was trained on
//!
//! **The schema belongs to the loaded classifier, never to the input record.**
//!
//! ## Rules:
//! 1. Column order is the order of the trained model's input
//! 2. Add / remove / reorder a column → new schema version
//! 3. Artifacts may carry the layout hash; a stale hash is schema drift
//!
//! ## Why hashing matters:
//! - Catch a manifest edited without retraining
//! - Catch model files paired with the wrong column list

use std::collections::HashMap;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::ModelLoadError;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version + ordered column names
pub fn compute_layout_hash<S: AsRef<str>>(version: u32, columns: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&version.to_le_bytes());

    for name in columns {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Serialized form, as found in a model manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSpec {
    pub version: u32,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<u32>,
}

/// Ordered, versioned feature-column schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaSpec", into = "SchemaSpec")]
pub struct FeatureSchema {
    version: u32,
    columns: Vec<String>,
    hash: u32,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from an ordered column list
    pub fn new<S: AsRef<str>>(version: u32, columns: &[S]) -> Result<Self, ModelLoadError> {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let mut index = HashMap::with_capacity(columns.len());

        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ModelLoadError::SchemaMismatch(format!("column {} has an empty name", i)));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(ModelLoadError::SchemaMismatch(format!("duplicate column '{}'", name)));
            }
        }

        Ok(Self {
            hash: compute_layout_hash(version, &columns),
            version,
            columns,
            index,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column (O(1))
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Check a hash recorded elsewhere against this layout
    pub fn verify_hash(&self, expected: u32) -> Result<(), ModelLoadError> {
        if expected != self.hash {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "layout hash mismatch: manifest says {:08x}, columns hash to {:08x} (v{})",
                expected, self.hash, self.version
            )));
        }
        Ok(())
    }
}

impl TryFrom<SchemaSpec> for FeatureSchema {
    type Error = ModelLoadError;

    fn try_from(spec: SchemaSpec) -> Result<Self, Self::Error> {
        let schema = FeatureSchema::new(spec.version, &spec.columns)?;
        if let Some(expected) = spec.hash {
            schema.verify_hash(expected)?;
        }
        Ok(schema)
    }
}

impl From<FeatureSchema> for SchemaSpec {
    fn from(schema: FeatureSchema) -> Self {
        SchemaSpec {
            version: schema.version,
            hash: Some(schema.hash),
            columns: schema.columns,
        }
    }
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.columns == other.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureSchema {
        FeatureSchema::new(1, &["duration", "protocol_type=tcp", "service=http", "flag=SF"]).unwrap()
    }

    #[test]
    fn test_layout_hash_consistency() {
        let a = compute_layout_hash(1, &["a", "b"]);
        let b = compute_layout_hash(1, &["a", "b"]);
        assert_eq!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_layout_hash_depends_on_order_and_version() {
        let base = compute_layout_hash(1, &["a", "b"]);
        assert_ne!(base, compute_layout_hash(1, &["b", "a"]));
        assert_ne!(base, compute_layout_hash(2, &["a", "b"]));
        // Separator keeps "ab" + "" distinct from "a" + "b"
        assert_ne!(base, compute_layout_hash(1, &["ab", ""]));
    }

    #[test]
    fn test_index_lookup() {
        let schema = sample();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.index_of("duration"), Some(0));
        assert_eq!(schema.index_of("flag=SF"), Some(3));
        assert_eq!(schema.index_of("nonexistent"), None);
        assert_eq!(schema.column_name(1), Some("protocol_type=tcp"));
        assert_eq!(schema.column_name(100), None);
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = FeatureSchema::new(1, &["duration", "duration"]);
        assert!(matches!(result, Err(ModelLoadError::SchemaMismatch(_))));
    }

    #[test]
    fn test_deserialize_verifies_hash() {
        let schema = sample();
        let good = serde_json::json!({
            "version": 1,
            "columns": schema.columns(),
            "hash": schema.hash(),
        });
        let parsed: FeatureSchema = serde_json::from_value(good).unwrap();
        assert_eq!(parsed, schema);

        let stale = serde_json::json!({
            "version": 1,
            "columns": schema.columns(),
            "hash": schema.hash().wrapping_add(1),
        });
        assert!(serde_json::from_value::<FeatureSchema>(stale).is_err());
    }

    #[test]
    fn test_deserialize_without_hash() {
        let json = serde_json::json!({ "version": 3, "columns": ["x", "y"] });
        let parsed: FeatureSchema = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.version(), 3);
        assert_eq!(parsed.hash(), compute_layout_hash(3, &["x", "y"]));
    }
}
