//! Confidence-weighted fusion
//!
//! `normalized = Σ(score·confidence) / Σ(confidence)` over signals with a
//! score, each read as suspicion (authenticity-declared scores become
//! `1 - score`). Being a weighted average of values in [0, 1], the result stays in
//! [0, 1]. Reported confidence is `min(1, normalized + offset)`. It measures how
//! far the evidence pointed, not how much evidence there was.

use super::{build_explanation, round_to, FusionStrategy, Label, ProbabilitySource, Verdict};
use crate::policy::{ConfidenceWeightedPolicy, ExplanationPolicy, FusionMode};
use crate::signal::{Polarity, SignalSet};

#[derive(Debug, Clone, Default)]
pub struct ConfidenceWeighted {
    policy: ConfidenceWeightedPolicy,
    explanation: ExplanationPolicy,
}

impl ConfidenceWeighted {
    pub fn new(policy: ConfidenceWeightedPolicy, explanation: ExplanationPolicy) -> Self {
        Self { policy, explanation }
    }

    /// Normalized score, or `None` when the confidence sum is zero
    pub fn normalized_score(signals: &SignalSet) -> Option<f64> {
        let (weighted_sum, confidence_sum) = signals
            .iter()
            .filter_map(|(_, s)| {
                s.score_as(Polarity::Suspicion, Polarity::Suspicion)
                    .map(|score| (score, s.confidence))
            })
            .fold((0.0, 0.0), |(ws, cs), (score, conf)| (ws + score * conf, cs + conf));

        if confidence_sum <= 0.0 {
            return None;
        }
        Some((weighted_sum / confidence_sum).clamp(0.0, 1.0))
    }

    /// Band a normalized score; lower bounds are inclusive
    pub fn label_for(&self, normalized: f64) -> Label {
        if normalized >= self.policy.ai_generated_min {
            Label::AiGenerated
        } else if normalized >= self.policy.ai_edited_min {
            Label::AiEdited
        } else {
            Label::Real
        }
    }
}

impl FusionStrategy for ConfidenceWeighted {
    fn mode(&self) -> FusionMode {
        FusionMode::ConfidenceWeighted
    }

    fn decide(&self, signals: &SignalSet) -> Verdict {
        let Some(normalized) = Self::normalized_score(signals) else {
            tracing::debug!("Fusion: no usable evidence across {} signals", signals.len());
            return Verdict::indeterminate(
                self.mode(),
                self.policy.indeterminate_probability,
                &self.explanation.no_evidence,
            );
        };

        let label = self.label_for(normalized);
        let confidence = (normalized + self.policy.confidence_offset).clamp(0.0, 1.0);
        tracing::debug!("Fusion (confidence-weighted): normalized={:.4} → {}", normalized, label);

        Verdict {
            label,
            ai_probability: round_to(normalized, 3),
            confidence: round_to(confidence, 2),
            explanation: build_explanation(
                signals,
                &self.explanation,
                label.evidence_polarity(),
                Polarity::Suspicion,
            ),
            fused_score: Some(normalized),
            mode: self.mode(),
            probability_source: ProbabilitySource::Fusion,
        }
    }
}
