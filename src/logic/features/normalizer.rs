//! Feature Normalizer
//!
//! Expands a record into named columns and aligns them to the trained schema.
//! Columns unknown to the schema are dropped; schema columns absent from the
//! record stay 0. Unknown categorical values never raise: a value the model
//! was not trained on cannot add a dimension at inference time.

use super::record::FlowFeatureRecord;
use super::schema::FeatureSchema;
use super::vector::AlignedFeatureVector;

/// Align a record to `schema`. Pure; no hidden state.
pub fn normalize(record: &FlowFeatureRecord, schema: &FeatureSchema) -> AlignedFeatureVector {
    let mut vector = AlignedFeatureVector::zeros(schema);
    let mut dropped = 0usize;

    for (column, value) in record.expanded_columns() {
        match schema.index_of(&column) {
            Some(i) => vector.values[i] = value,
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::trace!(dropped, schema_version = schema.version(), "Columns outside schema dropped");
    }

    vector
}
