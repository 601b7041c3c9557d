//! Static-weighted fusion
//!
//! Fixed constants over `exif`, `jpeg`, `frequency` and `noise`. Signals
//! without a score drop out and the remaining weights are renormalized by
//! their sum. Other signals in the set (format, patch consistency) only feed
//! the explanation.
//!
//! Scores are read with authenticity polarity here: a high fused value means
//! camera-like, so `ai_probability = 1 - fused`. Suspicion-declared signals
//! (noise) enter as `1 - score`.

use super::{build_explanation, round_to, FusionStrategy, Label, ProbabilitySource, Verdict};
use crate::policy::{ExplanationPolicy, FusionMode, StaticWeightedPolicy};
use crate::signal::{Polarity, SignalSet};

#[derive(Debug, Clone, Default)]
pub struct StaticWeighted {
    policy: StaticWeightedPolicy,
    explanation: ExplanationPolicy,
}

impl StaticWeighted {
    pub fn new(policy: StaticWeightedPolicy, explanation: ExplanationPolicy) -> Self {
        Self { policy, explanation }
    }

    /// Renormalized weighted score, or `None` when no weighted signal applies
    pub fn fused_score(&self, signals: &SignalSet) -> Option<f64> {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (name, weight) in self.policy.weights.entries() {
            let score = signals
                .get(name)
                .and_then(|s| s.score_as(Polarity::Authenticity, Polarity::Authenticity));
            if let Some(score) = score {
                numerator += score * weight;
                denominator += weight;
            }
        }
        if denominator <= 0.0 {
            return None;
        }
        Some((numerator / denominator).clamp(0.0, 1.0))
    }

    pub fn label_for(&self, fused: f64) -> Label {
        if fused >= self.policy.real_min {
            Label::Real
        } else if fused >= self.policy.edited_min {
            Label::AiEdited
        } else {
            Label::AiGenerated
        }
    }
}

impl FusionStrategy for StaticWeighted {
    fn mode(&self) -> FusionMode {
        FusionMode::StaticWeighted
    }

    fn decide(&self, signals: &SignalSet) -> Verdict {
        let Some(fused) = self.fused_score(signals) else {
            tracing::debug!("Fusion: none of the weighted signals applied");
            return Verdict::indeterminate(
                self.mode(),
                self.policy.indeterminate_probability,
                &self.explanation.no_evidence,
            );
        };

        let label = self.label_for(fused);
        let certainty = fused.max(1.0 - fused);
        let confidence = (certainty + self.policy.confidence_offset).clamp(0.0, 1.0);
        tracing::debug!("Fusion (static-weighted): fused={:.4} → {}", fused, label);

        Verdict {
            label,
            ai_probability: round_to(1.0 - fused, 3),
            confidence: round_to(confidence, 2),
            explanation: build_explanation(
                signals,
                &self.explanation,
                label.evidence_polarity(),
                Polarity::Authenticity,
            ),
            fused_score: Some(fused),
            mode: self.mode(),
            probability_source: ProbabilitySource::Fusion,
        }
    }
}
