//! Decision engine — fuses a `SignalSet` into one `Verdict`
//!
//! Two strategies sit behind `FusionStrategy`:
//!
//! - `confidence_weighted`: each signal's own confidence is its weight
//! - `static_weighted`: fixed per-signal constants over the canonical four
//!   signals, renormalized over the ones that apply
//!
//! Each strategy reads scores in its native direction (suspicion for
//! confidence-weighted, authenticity for static-weighted) and flips any
//! signal declared the other way before weighting.
//!
//! Both check for an empty denominator before dividing and return an
//! explicit `UNKNOWN` verdict in that case. Decisions are pure: the same
//! signals always yield the same verdict.

pub mod confidence_weighted;
pub mod static_weighted;

pub use confidence_weighted::ConfidenceWeighted;
pub use static_weighted::StaticWeighted;

use crate::policy::{ExplanationPolicy, FusionMode, FusionPolicy};
use crate::signal::{Polarity, SignalSet};
use serde::{Deserialize, Serialize};

// ─── Verdict ───────────────────────────────────────────────────────

/// Terminal decision label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    AiGenerated,
    AiEdited,
    Real,
    Unknown,
}

impl Label {
    /// Direction of the evidence that supports this label
    pub fn evidence_polarity(&self) -> Polarity {
        match self {
            Self::Real => Polarity::Authenticity,
            _ => Polarity::Suspicion,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AiGenerated => write!(f, "AI_GENERATED"),
            Self::AiEdited => write!(f, "AI_EDITED"),
            Self::Real => write!(f, "REAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Where `Verdict::ai_probability` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilitySource {
    #[default]
    Fusion,
    Model,
}

/// Result of one fusion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// Probability the image is AI-generated or AI-edited, in [0, 1]
    pub ai_probability: f64,
    /// Strength of the decision, in [0, 1]; not the amount of evidence
    pub confidence: f64,
    pub explanation: String,
    /// Normalized fused score; `None` when no usable evidence existed
    pub fused_score: Option<f64>,
    pub mode: FusionMode,
    pub probability_source: ProbabilitySource,
}

impl Verdict {
    /// Zero-evidence verdict
    pub(crate) fn indeterminate(mode: FusionMode, probability: f64, explanation: &str) -> Self {
        Self {
            label: Label::Unknown,
            ai_probability: probability,
            confidence: 0.0,
            explanation: explanation.to_string(),
            fused_score: None,
            mode,
            probability_source: ProbabilitySource::Fusion,
        }
    }

    /// Replace the probability with an external model's estimate. Label
    /// and explanation are left untouched.
    pub fn with_model_probability(mut self, probability: f64) -> Self {
        self.ai_probability = if probability.is_nan() { 0.5 } else { probability.clamp(0.0, 1.0) };
        self.probability_source = ProbabilitySource::Model;
        self
    }

    pub fn is_indeterminate(&self) -> bool {
        self.label == Label::Unknown
    }
}

// ─── Strategy Seam ─────────────────────────────────────────────────

/// A named fusion algorithm
pub trait FusionStrategy: Send + Sync {
    fn mode(&self) -> FusionMode;

    fn decide(&self, signals: &SignalSet) -> Verdict;
}

/// Build the strategy a policy selects
pub fn strategy_for(policy: &FusionPolicy) -> Box<dyn FusionStrategy> {
    match policy.mode {
        FusionMode::ConfidenceWeighted => Box::new(ConfidenceWeighted::new(
            policy.confidence_weighted.clone(),
            policy.explanation.clone(),
        )),
        FusionMode::StaticWeighted => Box::new(StaticWeighted::new(
            policy.static_weighted.clone(),
            policy.explanation.clone(),
        )),
    }
}

/// Confidence-weighted fusion with default policy
pub fn decide(signals: &SignalSet) -> Verdict {
    ConfidenceWeighted::default().decide(signals)
}

// ─── Explanation ───────────────────────────────────────────────────

/// Up to `max_reasons` qualifying signals in insertion order, rendered
/// `"<name>: <reason>"`, followed by the names of inapplicable signals.
/// A signal qualifies when its score read `toward` the label's direction
/// clears the threshold; undeclared signals are read as `native`.
pub(crate) fn build_explanation(
    signals: &SignalSet,
    policy: &ExplanationPolicy,
    toward: Polarity,
    native: Polarity,
) -> String {
    let contributing: Vec<String> = signals
        .iter()
        .filter(|(_, s)| {
            s.score_as(toward, native).map_or(false, |score| score > policy.min_score)
                && s.confidence > policy.min_confidence
        })
        .take(policy.max_reasons)
        .map(|(name, s)| format!("{}: {}", name, s.reason))
        .collect();

    let mut text = if contributing.is_empty() {
        policy.fallback.clone()
    } else {
        contributing.join(&policy.separator)
    };

    let absent: Vec<&str> = signals
        .iter()
        .filter(|(_, s)| s.score.is_none())
        .map(|(name, _)| name)
        .collect();
    if !absent.is_empty() {
        text.push_str("; not applicable: ");
        text.push_str(&absent.join(", "));
    }
    text
}

pub(crate) fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}
