//! Forensic policy — `.pixtrace.toml` configuration for every cutoff
//!
//! All band tables, fixed outcomes, fusion weights, and thresholds live
//! here and are injected into the components that use them. None of the
//! numbers have a principled origin; they are calibration knobs.

use crate::detection::exif_tags;
use crate::signal::{Band, BandTable, Outcome};
use crate::{PixResult, PixtraceError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete analysis policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ForensicPolicy {
    pub producers: ProducerToggles,
    pub fusion: FusionPolicy,
    pub exif: ExifPolicy,
    pub jpeg: JpegPolicy,
    pub frequency: FrequencyPolicy,
    pub noise: NoisePolicy,
    pub patches: PatchPolicy,
    pub format: FormatPolicy,
    pub model: ModelPolicy,
}

// ─── Producers ─────────────────────────────────────────────────────

/// Which signal producers run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerToggles {
    pub format: bool,
    pub exif: bool,
    pub jpeg: bool,
    pub frequency: bool,
    pub noise: bool,
    pub noise_consistency: bool,
}

impl Default for ProducerToggles {
    fn default() -> Self {
        Self {
            format: true,
            exif: true,
            jpeg: true,
            frequency: true,
            noise: true,
            noise_consistency: true,
        }
    }
}

impl ProducerToggles {
    pub fn is_enabled(&self, signal: &str) -> bool {
        match signal {
            "format" => self.format,
            "exif" => self.exif,
            "jpeg" => self.jpeg,
            "frequency" => self.frequency,
            "noise" => self.noise,
            "noise_consistency" => self.noise_consistency,
            _ => true,
        }
    }
}

// ─── Fusion ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    #[default]
    ConfidenceWeighted,
    StaticWeighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FusionPolicy {
    pub mode: FusionMode,
    pub confidence_weighted: ConfidenceWeightedPolicy,
    pub static_weighted: StaticWeightedPolicy,
    pub explanation: ExplanationPolicy,
}

/// Cutoffs for fusion weighted by each signal's own confidence.
/// Higher fused score means more AI-like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeightedPolicy {
    /// `score >= ai_generated_min` → AI_GENERATED
    pub ai_generated_min: f64,
    /// `score >= ai_edited_min` → AI_EDITED, below → REAL
    pub ai_edited_min: f64,
    /// Reported confidence is `min(1, score + confidence_offset)`
    pub confidence_offset: f64,
    /// Probability reported when no usable evidence exists
    pub indeterminate_probability: f64,
}

impl Default for ConfidenceWeightedPolicy {
    fn default() -> Self {
        Self {
            ai_generated_min: 0.75,
            ai_edited_min: 0.45,
            confidence_offset: 0.15,
            indeterminate_probability: 0.0,
        }
    }
}

/// Fixed per-signal weights over the canonical four signals.
/// Scores are read as authenticity: higher means more camera-like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticWeightedPolicy {
    /// `score >= real_min` → REAL
    pub real_min: f64,
    /// `score >= edited_min` → AI_EDITED, below → AI_GENERATED
    pub edited_min: f64,
    pub confidence_offset: f64,
    pub indeterminate_probability: f64,
    pub weights: StaticWeights,
}

impl Default for StaticWeightedPolicy {
    fn default() -> Self {
        Self {
            real_min: 0.7,
            edited_min: 0.4,
            confidence_offset: 0.15,
            indeterminate_probability: 0.5,
            weights: StaticWeights::default(),
        }
    }
}

/// Constant weights summing to 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticWeights {
    pub exif: f64,
    pub jpeg: f64,
    pub frequency: f64,
    pub noise: f64,
}

impl Default for StaticWeights {
    fn default() -> Self {
        Self {
            exif: 0.2,
            jpeg: 0.3,
            frequency: 0.25,
            noise: 0.25,
        }
    }
}

impl StaticWeights {
    /// Weights in canonical signal order
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("exif", self.exif),
            ("jpeg", self.jpeg),
            ("frequency", self.frequency),
            ("noise", self.noise),
        ]
    }
}

/// How the verdict explanation is assembled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationPolicy {
    pub max_reasons: usize,
    /// A signal contributes when `score > min_score`...
    pub min_score: f64,
    /// ...and `confidence > min_confidence`
    pub min_confidence: f64,
    pub separator: String,
    pub fallback: String,
    pub no_evidence: String,
}

impl Default for ExplanationPolicy {
    fn default() -> Self {
        Self {
            max_reasons: 3,
            min_score: 0.4,
            min_confidence: 0.6,
            separator: " | ".into(),
            fallback: "No significant forensic inconsistencies detected".into(),
            no_evidence: "No reliable forensic signals available".into(),
        }
    }
}

// ─── Producer Policies ─────────────────────────────────────────────

/// EXIF coverage of an expected camera tag set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExifPolicy {
    pub expected_tags: Vec<String>,
    /// Signal when the format supports EXIF but none is present
    pub no_metadata: Outcome,
    /// Bands over `present / expected`
    pub coverage: BandTable,
}

impl Default for ExifPolicy {
    fn default() -> Self {
        Self {
            expected_tags: [
                "Make",
                "Model",
                "DateTime",
                "DateTimeOriginal",
                "ExifImageWidth",
                "ExifImageHeight",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            no_metadata: Outcome::new(0.0, 0.7, "No EXIF metadata found"),
            coverage: BandTable::builtin(vec![
                Band::upto(0.4, 0.3, 0.6, "Sparse or suspicious EXIF metadata"),
                Band::upto(0.7, 0.6, 0.7, "Partial EXIF metadata present"),
                Band::open(1.0, 0.9, "Rich and consistent EXIF metadata"),
            ]),
        }
    }
}

/// JPEG size-per-pixel compression profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpegPolicy {
    /// Bands over kilobytes per pixel
    pub compression: BandTable,
}

impl Default for JpegPolicy {
    fn default() -> Self {
        Self {
            compression: BandTable::builtin(vec![
                Band::upto(0.001, 0.3, 0.6, "JPEG compression highly atypical"),
                Band::upto(0.002, 0.6, 0.7, "JPEG compression slightly atypical"),
                Band::upto(0.01, 1.0, 0.85, "JPEG compression ratio within camera-like range"),
                Band::upto(0.015, 0.6, 0.7, "JPEG compression slightly atypical"),
                Band::open(0.3, 0.6, "JPEG compression highly atypical"),
            ]),
        }
    }
}

/// High-frequency spectral energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyPolicy {
    /// Low-frequency disc radius is `min(cx, cy) / radius_divisor`
    pub radius_divisor: u32,
    pub energy: BandTable,
}

impl Default for FrequencyPolicy {
    fn default() -> Self {
        Self {
            radius_divisor: 3,
            energy: BandTable::builtin(vec![
                Band::upto(0.08, 0.3, 0.6, "Unnatural frequency distribution detected"),
                Band::upto(0.15, 0.6, 0.7, "Slightly atypical frequency characteristics"),
                Band::upto(0.35, 1.0, 0.85, "Natural frequency distribution detected"),
                Band::upto(0.45, 0.6, 0.7, "Slightly atypical frequency characteristics"),
                Band::open(0.3, 0.6, "Unnatural frequency distribution detected"),
            ]),
        }
    }
}

/// Global noise entropy with a denoising-aware branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoisePolicy {
    pub histogram_bins: usize,
    pub denoise: DenoisePolicy,
    /// Bands over residual entropy (nats)
    pub entropy: BandTable,
}

impl Default for NoisePolicy {
    fn default() -> Self {
        Self {
            histogram_bins: 256,
            denoise: DenoisePolicy::default(),
            entropy: BandTable::builtin(vec![
                Band::upto(3.8, 0.6, 0.6, "Unnatural noise pattern (possible synthetic origin)"),
                Band::upto(4.5, 0.45, 0.7, "Moderately atypical noise (possible processing)"),
                Band::upto(5.5, 0.2, 0.85, "Natural sensor-like noise detected"),
                Band::upto(6.2, 0.45, 0.7, "Moderately atypical noise (possible processing)"),
                Band::open(0.6, 0.6, "Unnatural noise pattern (possible synthetic origin)"),
            ]),
        }
    }
}

/// Low entropy with a quiet Laplacian reads as phone-camera denoising
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoisePolicy {
    pub max_entropy: f64,
    pub max_laplacian_std: f64,
    pub outcome: Outcome,
}

impl Default for DenoisePolicy {
    fn default() -> Self {
        Self {
            max_entropy: 3.8,
            max_laplacian_std: 10.0,
            outcome: Outcome::new(0.3, 0.75, "Low-entropy noise consistent with phone-camera denoising"),
        }
    }
}

/// Patch-level noise consistency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchPolicy {
    pub patch_size: u32,
    pub stride: u32,
    /// A patch counts as suspicious when its score exceeds this
    pub suspicious_score: f64,
    /// `suspicious_ratio > high_ratio` → `high`
    pub high_ratio: f64,
    /// `ratio > localized_ratio && variance > localized_variance` → `localized`
    pub localized_ratio: f64,
    pub localized_variance: f64,
    /// Reason reported when the image yields no patches
    pub empty_reason: String,
    /// Per-patch bands over residual std; only the score is used
    pub patch_bands: BandTable,
    pub high: Outcome,
    pub localized: Outcome,
    pub consistent: Outcome,
}

impl Default for PatchPolicy {
    fn default() -> Self {
        Self {
            patch_size: 64,
            stride: 32,
            suspicious_score: 0.6,
            high_ratio: 0.6,
            localized_ratio: 0.15,
            localized_variance: 0.01,
            empty_reason: "Image smaller than one analysis patch; noise consistency not measurable".into(),
            patch_bands: BandTable::builtin(vec![
                Band::upto(1.5, 0.9, 1.0, "over-smoothed"),
                Band::upto(3.0, 0.6, 1.0, "moderate"),
                Band::open(0.2, 1.0, "natural"),
            ]),
            high: Outcome::new(0.8, 0.9, "High proportion of patches show non-natural noise patterns"),
            localized: Outcome::new(0.6, 0.8, "Localized noise inconsistencies detected across patches"),
            consistent: Outcome::new(0.2, 0.7, "Noise patterns consistent across image"),
        }
    }
}

/// Declared-extension vs sniffed-format outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPolicy {
    pub unknown: Outcome,
    pub mismatch: Outcome,
    pub uncommon: Outcome,
    pub consistent: Outcome,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            unknown: Outcome::new(0.35, 0.7, "Unknown image format detected"),
            mismatch: Outcome::new(0.4, 0.8, "File extension does not match actual image format"),
            uncommon: Outcome::new(0.3, 0.6, "Uncommon image format for camera capture"),
            consistent: Outcome::new(0.0, 0.5, "Image format appears consistent with standard camera pipelines"),
        }
    }
}

// ─── Probability Model ─────────────────────────────────────────────

/// Logistic model over the canonical feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPolicy {
    pub enabled: bool,
    pub intercept: f64,
    /// Coefficients in feature order: exif, jpeg, frequency, noise
    pub coefficients: [f64; 4],
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            intercept: 2.0,
            // Negative on the authenticity features, positive on noise suspicion
            coefficients: [-4.0, -3.0, -5.0, 5.0],
        }
    }
}

// ─── Loading & Validation ──────────────────────────────────────────

impl ForensicPolicy {
    /// Load and validate a policy file
    pub fn from_file(path: &Path) -> PixResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: ForensicPolicy = toml::from_str(&content)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Try `.pixtrace.toml` then `pixtrace.toml` in `dir`, fall back to defaults
    pub fn from_dir_or_default(dir: &Path) -> Self {
        for name in [".pixtrace.toml", "pixtrace.toml"] {
            let path = dir.join(name);
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(policy) => {
                    tracing::info!("Loaded policy from {}", path.display());
                    return policy;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}; using defaults", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Default policy rendered as TOML (for `--init-config`)
    pub fn default_toml() -> PixResult<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| PixtraceError::Policy(e.to_string()))
    }

    /// Reject combinations the components cannot honour
    pub fn validate(&self) -> PixResult<()> {
        let fail = |msg: String| Err(PixtraceError::Policy(msg));

        let cw = &self.fusion.confidence_weighted;
        if !(unit(cw.ai_edited_min) && unit(cw.ai_generated_min) && cw.ai_edited_min < cw.ai_generated_min) {
            return fail("confidence_weighted cutoffs must satisfy 0 <= ai_edited_min < ai_generated_min <= 1".into());
        }
        if !unit(cw.indeterminate_probability) || !cw.confidence_offset.is_finite() {
            return fail("confidence_weighted indeterminate_probability/confidence_offset out of range".into());
        }

        let sw = &self.fusion.static_weighted;
        if !(unit(sw.edited_min) && unit(sw.real_min) && sw.edited_min < sw.real_min) {
            return fail("static_weighted cutoffs must satisfy 0 <= edited_min < real_min <= 1".into());
        }
        if !unit(sw.indeterminate_probability) || !sw.confidence_offset.is_finite() {
            return fail("static_weighted indeterminate_probability/confidence_offset out of range".into());
        }
        let weights = sw.weights.entries();
        if weights.iter().any(|(_, w)| !w.is_finite() || *w < 0.0) {
            return fail("static weights must be non-negative".into());
        }
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > 1e-6 {
            return fail(format!("static weights must sum to 1 (got {:.4})", total));
        }

        if self.exif.expected_tags.is_empty() {
            return fail("exif.expected_tags must not be empty".into());
        }
        if let Some(unknown) = self.exif.expected_tags.iter().find(|t| exif_tags::tag_id(t).is_none()) {
            return fail(format!("unknown EXIF tag name '{}'", unknown));
        }

        if self.frequency.radius_divisor == 0 {
            return fail("frequency.radius_divisor must be > 0".into());
        }
        if self.noise.histogram_bins == 0 {
            return fail("noise.histogram_bins must be > 0".into());
        }
        if self.patches.patch_size == 0 || self.patches.stride == 0 {
            return fail("patches.patch_size and patches.stride must be > 0".into());
        }

        let outcomes = [
            ("exif.no_metadata", &self.exif.no_metadata),
            ("noise.denoise.outcome", &self.noise.denoise.outcome),
            ("patches.high", &self.patches.high),
            ("patches.localized", &self.patches.localized),
            ("patches.consistent", &self.patches.consistent),
            ("format.unknown", &self.format.unknown),
            ("format.mismatch", &self.format.mismatch),
            ("format.uncommon", &self.format.uncommon),
            ("format.consistent", &self.format.consistent),
        ];
        if let Some((name, _)) = outcomes.iter().find(|(_, o)| !o.is_valid()) {
            return fail(format!("{} has score/confidence outside [0, 1]", name));
        }

        Ok(())
    }
}

fn unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}
