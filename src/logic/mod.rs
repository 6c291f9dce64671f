//! Logic Module - Detection Decision Engine
//!
//! Leaf-first: features -> model / simulator -> severity -> mode -> alert -> engine.

pub mod config;
pub mod error;
pub mod threat;
pub mod features;
pub mod model;
pub mod simulator;
pub mod severity;
pub mod mode;
pub mod alert;
pub mod engine;
pub mod history;
pub mod ingest;
