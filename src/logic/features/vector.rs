//! Aligned Feature Vector - classifier input
//!
//! **Versioned feature vector tied to a schema layout**
//!
//! Length and column order always come from the `FeatureSchema` that produced
//! it. The layout hash travels with the values so a backend can refuse a
//! vector built for a different schema.

use serde::{Deserialize, Serialize};

use super::schema::FeatureSchema;
use crate::logic::error::DetectionError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedFeatureVector {
    /// Schema version the vector was aligned to
    pub version: u32,
    /// CRC32 of the schema layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in schema order
    pub values: Vec<f32>,
}

impl AlignedFeatureVector {
    /// All-zero vector for a schema
    pub fn zeros(schema: &FeatureSchema) -> Self {
        Self {
            version: schema.version(),
            layout_hash: schema.hash(),
            values: vec![0.0; schema.len()],
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by column name
    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f32> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    /// Number of non-zero entries
    pub fn non_zero_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    /// Refuse vectors aligned to another layout
    pub fn ensure_layout(&self, schema: &FeatureSchema) -> Result<(), DetectionError> {
        if self.layout_hash != schema.hash() || self.values.len() != schema.len() {
            return Err(DetectionError::InferenceError(format!(
                "feature vector layout {:08x} (len {}) does not match schema {:08x} (len {})",
                self.layout_hash,
                self.values.len(),
                schema.hash(),
                schema.len()
            )));
        }
        Ok(())
    }
}
