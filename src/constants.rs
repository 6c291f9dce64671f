//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value here can be overridden through the environment (see `EngineConfig`).

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ids-core";

/// Default operational mode when `IDS_MODE` is not set
pub const DEFAULT_MODE: &str = "SIMULATED";

/// Default confidence threshold (informational, reserved for decision gating)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Default probability that a simulated decision is an attack
pub const DEFAULT_ATTACK_PROBABILITY: f64 = 0.60;

/// Confidence range drawn for simulated attacks
pub const DEFAULT_ATTACK_CONFIDENCE: (f32, f32) = (0.75, 0.99);

/// Confidence range drawn for simulated normal traffic
pub const DEFAULT_NORMAL_CONFIDENCE: (f32, f32) = (0.10, 0.40);

/// Default alert dedup window (seconds)
pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 60;

/// Default number of alert keys kept in the dedup history
pub const DEFAULT_DEDUP_CAPACITY: usize = 10_000;

/// Class name treated as benign traffic when a manifest does not say otherwise
pub const DEFAULT_NORMAL_CLASS: &str = "normal";

/// Default number of input lines handled concurrently by the binary
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Rotation size for the JSONL history files
pub const MAX_HISTORY_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model manifest path, if one is configured
pub fn get_model_path() -> Option<String> {
    std::env::var("IDS_MODEL_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Get initial operational mode from environment or use default
pub fn get_mode() -> String {
    std::env::var("IDS_MODE")
        .unwrap_or_else(|_| DEFAULT_MODE.to_string())
}

/// Get initial confidence threshold from environment or use default
pub fn get_confidence_threshold() -> f32 {
    std::env::var("IDS_CONFIDENCE_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
}

/// Get simulator attack probability from environment or use default
pub fn get_attack_probability() -> f64 {
    std::env::var("IDS_ATTACK_PROBABILITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ATTACK_PROBABILITY)
}

/// Get simulator seed, if the run should be reproducible
pub fn get_simulator_seed() -> Option<u64> {
    std::env::var("IDS_SIMULATOR_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Get dedup window from environment or use default
pub fn get_dedup_window_secs() -> u64 {
    std::env::var("IDS_DEDUP_WINDOW_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DEDUP_WINDOW_SECS)
}

/// Get dedup history capacity from environment or use default
pub fn get_dedup_capacity() -> usize {
    std::env::var("IDS_DEDUP_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_DEDUP_CAPACITY)
}

/// Check if attack-type severity escalation is enabled
pub fn is_escalation_enabled() -> bool {
    std::env::var("IDS_ESCALATE_KNOWN_ATTACKS")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}

/// Get history directory from environment or use the per-user data dir
pub fn get_history_dir() -> std::path::PathBuf {
    std::env::var("IDS_HISTORY_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(APP_NAME)
                .join("history")
        })
}

/// Check if log output should be JSON instead of human-readable text
pub fn is_json_logging() -> bool {
    std::env::var("IDS_LOG_FORMAT")
        .map(|s| s.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Get the cap on concurrently handled input lines
pub fn get_max_in_flight() -> usize {
    std::env::var("IDS_MAX_IN_FLIGHT")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_IN_FLIGHT)
}
