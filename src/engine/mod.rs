//! # Forensic Engine — Orchestrator
//!
//! - `pipeline` — `SignalProducer` trait, guarded execution, parallel fan-out
//! - `phases/` — one producer per forensic signal
//! - `file_index` — directory walk for batch analysis
//!
//! Flow per image: read bytes → sniff format → decode luma once → run
//! producers in parallel → join into a `SignalSet` → fuse → optional
//! probability model → `AnalysisReport`.

pub mod file_index;
pub mod phases;
pub mod pipeline;

use crate::features::{FeatureVector, LogisticModel, ProbabilityModel};
use crate::fusion::{strategy_for, FusionStrategy, Verdict};
use crate::ingest::detector::{FormatDetector, FormatInfo};
use crate::ingest::ImageInput;
use crate::policy::ForensicPolicy;
use crate::signal::SignalSet;
use crate::{PixResult, PixtraceError};
use chrono::{DateTime, Utc};
use pipeline::{ProducerStats, SignalProducer};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ─── Analysis Report ───────────────────────────────────────────────

/// Complete result for one image
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub image: String,
    pub sha256: String,
    pub file_size: u64,
    pub format: FormatInfo,
    pub signals: SignalSet,
    pub verdict: Verdict,
    /// Canonical feature vector (exif, jpeg, frequency, noise)
    pub features: FeatureVector,
    /// External model estimate, when a model is configured
    pub model_probability: Option<f64>,
    pub producer_stats: Vec<ProducerStats>,
    pub duration_ms: u64,
    pub analyzed_at: DateTime<Utc>,
    pub analyzer_version: String,
}

// ─── Engine ────────────────────────────────────────────────────────

/// The pixtrace forensic analyzer
pub struct ForensicEngine {
    policy: ForensicPolicy,
    detector: FormatDetector,
    producers: Vec<Box<dyn SignalProducer>>,
    strategy: Box<dyn FusionStrategy>,
    model: Option<Box<dyn ProbabilityModel>>,
}

impl ForensicEngine {
    /// Build an engine, rejecting a policy that fails validation
    pub fn try_new(policy: ForensicPolicy) -> PixResult<Self> {
        policy.validate()?;
        Ok(Self::new(policy))
    }

    /// Build an engine without rejecting the policy. Validation problems
    /// are logged; prefer `try_new` for policies assembled in code.
    pub fn new(policy: ForensicPolicy) -> Self {
        if let Err(e) = policy.validate() {
            tracing::warn!("Policy failed validation: {}", e);
        }
        let model: Option<Box<dyn ProbabilityModel>> = if policy.model.enabled {
            Some(Box::new(LogisticModel::from_policy(&policy.model)))
        } else {
            None
        };
        Self {
            detector: FormatDetector::default(),
            producers: phases::build_producers(&policy),
            strategy: strategy_for(&policy.fusion),
            model,
            policy,
        }
    }

    /// Replace the probability model
    pub fn with_model(mut self, model: Box<dyn ProbabilityModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replace the format detector (e.g. a custom signature table)
    pub fn with_detector(mut self, detector: FormatDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn policy(&self) -> &ForensicPolicy {
        &self.policy
    }

    /// Analyze one image file. Only an unreadable path is an error.
    pub fn analyze(&self, path: &Path) -> PixResult<AnalysisReport> {
        let input = ImageInput::open(path, &self.detector)?;
        Ok(self.analyze_input(&input))
    }

    /// Analyze an already-loaded image
    pub fn analyze_input(&self, input: &ImageInput) -> AnalysisReport {
        let start = std::time::Instant::now();
        tracing::info!("═══════════════════════════════════════════════════════");
        tracing::info!(
            "pixtrace: {} ({}, {} bytes)",
            input.path.display(),
            input.format.detected_format,
            input.file_size()
        );
        tracing::info!("═══════════════════════════════════════════════════════");

        let results = pipeline::run_producers_parallel(&self.producers, &self.policy, input);
        let mut producer_stats = Vec::with_capacity(results.len());
        let mut signals = SignalSet::new();
        for (stats, signal) in results {
            signals.insert(stats.name.clone(), signal);
            producer_stats.push(stats);
        }

        let mut verdict = self.strategy.decide(&signals);
        let features = FeatureVector::from_signal_set(&signals);

        let model_probability = self.model.as_ref().map(|model| {
            let p = model.predict(&features);
            tracing::debug!("Model '{}': probability {:.3}", model.name(), p);
            p
        });
        // No evidence means no verdict to refine
        if let Some(p) = model_probability {
            if !verdict.is_indeterminate() {
                verdict = verdict.with_model_probability(p);
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Verdict: {} (ai_probability={:.3}, confidence={:.2}), {}ms",
            verdict.label,
            verdict.ai_probability,
            verdict.confidence,
            duration_ms
        );

        AnalysisReport {
            image: input.path.display().to_string(),
            sha256: input.sha256(),
            file_size: input.file_size(),
            format: input.format.clone(),
            signals,
            verdict,
            features,
            model_probability,
            producer_stats,
            duration_ms,
            analyzed_at: Utc::now(),
            analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Analyze every image under a directory in parallel. Per-file errors
    /// are returned alongside the path; they never abort the batch.
    pub fn analyze_directory(&self, dir: &Path) -> PixResult<Vec<(PathBuf, PixResult<AnalysisReport>)>> {
        use rayon::prelude::*;

        if !dir.is_dir() {
            return Err(PixtraceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {}", dir.display()),
            )));
        }

        let index = file_index::ImageIndex::build(dir);
        tracing::info!("Batch: {} images under {}", index.len(), dir.display());

        let results: Vec<_> = index
            .images()
            .par_iter()
            .map(|img| (img.path.clone(), self.analyze(&img.path)))
            .collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            tracing::warn!("Batch: {} of {} images could not be read", failed, results.len());
        }
        Ok(results)
    }
}

impl Default for ForensicEngine {
    fn default() -> Self {
        Self::new(ForensicPolicy::default())
    }
}
