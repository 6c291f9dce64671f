//! Features Module - Record Alignment Engine
//!
//! Turns a raw flow-feature record into the exact numeric layout a trained
//! classifier expects.
//!
//! - `record`: input record + validation + column expansion
//! - `schema`: versioned, hashed column layout owned by the classifier
//! - `vector`: aligned classifier input
//! - `normalizer`: record → vector

pub mod record;
pub mod schema;
pub mod vector;
pub mod normalizer;


// Re-export common types
pub use record::{FlowFeatureRecord, FieldValue, REQUIRED_FIELDS};
pub use schema::{FeatureSchema, SchemaSpec, compute_layout_hash};
pub use vector::AlignedFeatureVector;
pub use normalizer::normalize;
