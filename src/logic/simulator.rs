//! Random Simulator
//!
//! Synthetic decisions for environments without a trained model (or demos).
//! Randomness is injected through `DecisionRng` so tests can pin outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::threat::Verdict;

// ============================================================================
// RANDOM SOURCE
// ============================================================================

/// Source of randomness for the simulator
pub trait DecisionRng: Send {
    /// Uniform draw in [0, 1)
    fn unit(&mut self) -> f64;

    /// Uniform index in [0, len); `len` is never 0
    fn index(&mut self, len: usize) -> usize;
}

/// `StdRng`-backed source, seeded or from OS entropy
#[derive(Debug, Clone)]
pub struct SeededRng(StdRng);

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl DecisionRng for SeededRng {
    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// NSL-KDD attack names the simulator picks from
pub const ATTACK_CATALOG: &[&str] = &[
    "neptune",
    "smurf",
    "back",
    "teardrop",
    "pod",
    "land",
    "satan",
    "ipsweep",
    "nmap",
    "portsweep",
    "guess_passwd",
    "warezclient",
];

/// Closed confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRange {
    pub low: f32,
    pub high: f32,
}

impl ConfidenceRange {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.low) || !in_unit(self.high) || self.low > self.high {
            return Err(format!(
                "{} confidence range [{}, {}] must satisfy 0 <= low <= high <= 1",
                name, self.low, self.high
            ));
        }
        Ok(())
    }

    /// Map a unit draw onto the range
    fn sample(&self, u: f64) -> f32 {
        let value = self.low as f64 + u * (self.high - self.low) as f64;
        (value as f32).clamp(self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Bernoulli probability of an ATTACK outcome
    pub attack_probability: f64,
    /// Confidence range for ATTACK outcomes
    pub attack_confidence: ConfidenceRange,
    /// Confidence range for NORMAL outcomes
    pub normal_confidence: ConfidenceRange,
    /// Attack names picked uniformly
    pub attack_catalog: Vec<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let (attack_lo, attack_hi) = constants::DEFAULT_ATTACK_CONFIDENCE;
        let (normal_lo, normal_hi) = constants::DEFAULT_NORMAL_CONFIDENCE;
        Self {
            attack_probability: constants::DEFAULT_ATTACK_PROBABILITY,
            attack_confidence: ConfidenceRange::new(attack_lo, attack_hi),
            normal_confidence: ConfidenceRange::new(normal_lo, normal_hi),
            attack_catalog: ATTACK_CATALOG.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.attack_probability.is_finite() || !(0.0..=1.0).contains(&self.attack_probability) {
            return Err(format!(
                "attack probability {} outside [0, 1]",
                self.attack_probability
            ));
        }
        self.attack_confidence.validate("attack")?;
        self.normal_confidence.validate("normal")?;
        if self.attack_catalog.is_empty() {
            return Err("attack catalog is empty".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// SIMULATOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RandomSimulator {
    config: SimulatorConfig,
}

impl RandomSimulator {
    pub fn new(config: SimulatorConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    /// One synthetic decision. Draw order: outcome, confidence, attack type.
    pub fn simulate(&self, rng: &mut dyn DecisionRng) -> Verdict {
        let is_attack = rng.unit() < self.config.attack_probability;

        if is_attack {
            let confidence = self.config.attack_confidence.sample(rng.unit());
            let pick = rng.index(self.config.attack_catalog.len());
            Verdict::attack(self.config.attack_catalog[pick].clone(), confidence)
        } else {
            Verdict::normal(self.config.normal_confidence.sample(rng.unit()))
        }
    }
}
