//! Patch aggregator — noise consistency across overlapping tiles
//!
//! Each patch gets a suspicion score from its residual standard deviation;
//! the scores are then folded into one signal by suspicious-patch ratio and
//! score variance. Patches are scored in parallel; aggregation waits for all.

use crate::detection::patches::{extract_patch, patch_origins};
use crate::detection::residual::{blur_residual, std_dev};
use crate::engine::pipeline::SignalProducer;
use crate::ingest::ImageInput;
use crate::policy::PatchPolicy;
use crate::signal::{Polarity, Signal};
use crate::PixResult;
use image::GrayImage;
use rayon::prelude::*;

/// One scored tile; never leaves this module
#[derive(Debug, Clone, Copy)]
struct PatchResult {
    origin: (u32, u32),
    score: f64,
}

/// Aggregate statistics over all patch scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchSummary {
    pub patches: usize,
    pub suspicious_ratio: f64,
    pub score_variance: f64,
}

pub struct NoiseConsistencyProducer {
    policy: PatchPolicy,
}

impl NoiseConsistencyProducer {
    pub fn new(policy: PatchPolicy) -> Self {
        Self { policy }
    }

    /// Suspicion score for one patch plane; `None` when its std is undefined
    pub fn score_patch(&self, patch: &[f32], size: usize) -> Option<f64> {
        let residual = blur_residual(patch, size, size, false);
        let sigma = std_dev(&residual)?;
        self.policy.patch_bands.classify(sigma).map(|band| band.score)
    }

    fn score_patches(&self, img: &GrayImage) -> Vec<PatchResult> {
        let size = self.policy.patch_size;
        patch_origins(img.width(), img.height(), size, self.policy.stride)
            .into_par_iter()
            .filter_map(|(x, y)| {
                let plane = extract_patch(img, x, y, size);
                self.score_patch(&plane, size as usize)
                    .map(|score| PatchResult { origin: (x, y), score })
            })
            .collect()
    }

    /// Ratio and population variance. `None` for an empty score list.
    pub fn summarize(&self, scores: &[f64]) -> Option<PatchSummary> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let suspicious = scores.iter().filter(|&&s| s > self.policy.suspicious_score).count();
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(PatchSummary {
            patches: scores.len(),
            suspicious_ratio: suspicious as f64 / n,
            score_variance: variance,
        })
    }

    /// Fold per-patch scores into one signal
    pub fn aggregate(&self, scores: &[f64]) -> Signal {
        let Some(summary) = self.summarize(scores) else {
            return Signal::not_applicable(self.policy.empty_reason.clone());
        };
        tracing::debug!(
            "Patches: {} scored, suspicious ratio {:.3}, variance {:.4}",
            summary.patches,
            summary.suspicious_ratio,
            summary.score_variance
        );

        let p = &self.policy;
        if summary.suspicious_ratio > p.high_ratio {
            p.high.signal()
        } else if summary.suspicious_ratio > p.localized_ratio && summary.score_variance > p.localized_variance {
            p.localized.signal()
        } else {
            p.consistent.signal()
        }
    }
}

impl SignalProducer for NoiseConsistencyProducer {
    fn name(&self) -> &str {
        "noise_consistency"
    }

    fn label(&self) -> &str {
        "Noise consistency"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Suspicion
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        let luma = input.luma()?;
        let results = self.score_patches(luma);
        if let Some(worst) = results.iter().max_by(|a, b| a.score.total_cmp(&b.score)) {
            tracing::debug!(
                "Patches: most suspicious tile at ({}, {}) scored {:.2}",
                worst.origin.0,
                worst.origin.1,
                worst.score
            );
        }
        let scores: Vec<f64> = results.into_iter().map(|p| p.score).collect();
        Ok(self.aggregate(&scores))
    }
}
