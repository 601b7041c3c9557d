//! Feature vectorizer and optional probability model
//!
//! Projects the four canonical signals into a fixed-order numeric vector.
//! Absent scores become a sentinel outside the valid score range so a model
//! can tell "not applicable" apart from a real zero.

use crate::policy::ModelPolicy;
use crate::signal::{Signal, SignalSet};
use serde::{Deserialize, Serialize};

/// Canonical feature order
pub const FEATURE_ORDER: [&str; 4] = ["exif", "jpeg", "frequency", "noise"];

/// Value used for a signal without a score
pub const ABSENT_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 4]);

impl FeatureVector {
    /// Vectorize the four canonical signals
    pub fn vectorize(exif: &Signal, jpeg: &Signal, frequency: &Signal, noise: &Signal) -> Self {
        let feature = |s: &Signal| s.score.unwrap_or(ABSENT_SENTINEL);
        Self([feature(exif), feature(jpeg), feature(frequency), feature(noise)])
    }

    /// Vectorize from a signal set; missing entries count as absent
    pub fn from_signal_set(signals: &SignalSet) -> Self {
        let mut values = [ABSENT_SENTINEL; 4];
        for (slot, name) in values.iter_mut().zip(FEATURE_ORDER) {
            if let Some(score) = signals.get(name).and_then(|s| s.score) {
                *slot = score;
            }
        }
        Self(values)
    }

    pub fn values(&self) -> &[f64; 4] {
        &self.0
    }

    /// Names paired with values, in canonical order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_ORDER.into_iter().zip(self.0.iter().copied())
    }
}

// ─── Probability Models ────────────────────────────────────────────

/// Maps a feature vector to an AI probability in [0, 1]
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &FeatureVector) -> f64;
}

/// `sigmoid(intercept + Σ coefficient·feature)`
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: [f64; 4],
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: [f64; 4]) -> Self {
        Self { intercept, coefficients }
    }

    pub fn from_policy(policy: &ModelPolicy) -> Self {
        Self::new(policy.intercept, policy.coefficients)
    }
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self::from_policy(&ModelPolicy::default())
    }
}

impl ProbabilityModel for LogisticModel {
    fn name(&self) -> &str {
        "logistic"
    }

    fn predict(&self, features: &FeatureVector) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(c, x)| c * x)
                .sum::<f64>();
        let p = 1.0 / (1.0 + (-z).exp());
        if p.is_nan() {
            0.5
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}
