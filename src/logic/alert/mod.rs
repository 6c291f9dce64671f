//! Alerts - event identity, alert payload and dedup history

pub mod types;
pub mod dedup;

pub use types::{AlertEvent, AlertKind, EventRef};
pub use dedup::AlertDeduplicator;
