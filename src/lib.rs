//! # pixtrace — Image Authenticity Forensics
//!
//! Estimates whether an image is camera-real, AI-generated, or edited by
//! computing independent heuristic forensic signals and fusing them into a
//! single explainable verdict.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ForensicEngine                          │
//! │  ┌──────────┐ ┌──────────────┐ ┌──────────┐ ┌────────────┐  │
//! │  │ Format   │ │ ImageInput   │ │ Policy   │ │ Probability│  │
//! │  │ Detector │ │ (bytes+luma) │ │ (.toml)  │ │ Model (opt)│  │
//! │  └────┬─────┘ └──────┬───────┘ └────┬─────┘ └─────┬──────┘  │
//! │       │              │              │             │         │
//! │  ┌────▼──────────────▼──────────────▼─────────────▼───────┐ │
//! │  │  Independent Signal Producers (rayon parallel)         │ │
//! │  │  format │ exif │ jpeg │ frequency │ noise │ patches    │ │
//! │  └────────────────────────┬───────────────────────────────┘ │
//! │                           │  SignalSet                      │
//! │  ┌────────────────────────▼───────────────────────────────┐ │
//! │  │ Fusion (confidence- or static-weighted) → Verdict      │ │
//! │  │ Feature Vectorizer → external probability (optional)   │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every producer is pure and absorbs its own failures: an inapplicable or
//! failed signal arrives at fusion as an absent score with zero confidence.
//! Fusion never divides by an empty evidence set; with nothing usable it
//! returns an explicit `UNKNOWN` verdict.

pub mod signal;
pub mod ingest;
pub mod detection;
pub mod engine;
pub mod fusion;
pub mod features;
pub mod policy;
pub mod report;

// Re-exports for convenience
pub use signal::{BandTable, Outcome, Polarity, Signal, SignalSet};
pub use ingest::{ImageInput, detector::{FormatDetector, FormatInfo, ImageFormat}};
pub use engine::{AnalysisReport, ForensicEngine};
pub use fusion::{decide, FusionStrategy, Label, Verdict};
pub use features::{FeatureVector, LogisticModel, ProbabilityModel};
pub use policy::ForensicPolicy;
pub use report::{render_batch, render_report, write_report, ReportFormat};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixtraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Policy parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type PixResult<T> = Result<T, PixtraceError>;
