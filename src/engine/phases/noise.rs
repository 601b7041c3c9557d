//! Global noise — residual entropy with a denoising-aware branch

use super::luma_plane;
use crate::detection::residual::{blur_residual, laplacian, normalized_entropy, std_dev};
use crate::engine::pipeline::SignalProducer;
use crate::ingest::ImageInput;
use crate::policy::NoisePolicy;
use crate::signal::{Polarity, Signal};
use crate::{PixResult, PixtraceError};

pub struct NoiseProducer {
    policy: NoisePolicy,
}

/// The two statistics the noise bands read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseStats {
    /// Shannon entropy (nats) of the normalized blur residual
    pub entropy: f64,
    /// Standard deviation of the Laplacian response
    pub laplacian_std: f64,
}

impl NoiseProducer {
    pub fn new(policy: NoisePolicy) -> Self {
        Self { policy }
    }

    pub fn measure(&self, plane: &[f32], width: usize, height: usize) -> Option<NoiseStats> {
        let residual = blur_residual(plane, width, height, true);
        let entropy = normalized_entropy(&residual, self.policy.histogram_bins)?;
        let laplacian_std = std_dev(&laplacian(plane, width, height))?;
        Some(NoiseStats { entropy, laplacian_std })
    }

    pub fn classify(&self, stats: NoiseStats) -> Option<Signal> {
        let denoise = &self.policy.denoise;
        if stats.entropy <= denoise.max_entropy && stats.laplacian_std <= denoise.max_laplacian_std {
            return Some(denoise.outcome.signal());
        }
        self.policy.entropy.classify(stats.entropy).map(|band| band.signal())
    }
}

impl SignalProducer for NoiseProducer {
    fn name(&self) -> &str {
        "noise"
    }

    fn label(&self) -> &str {
        "Noise"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Suspicion
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        let luma = input.luma()?;
        let (w, h) = (luma.width() as usize, luma.height() as usize);
        let stats = self
            .measure(&luma_plane(luma), w, h)
            .ok_or_else(|| PixtraceError::Analysis("empty residual".into()))?;
        tracing::debug!(
            "Noise: entropy {:.3}, laplacian std {:.3}",
            stats.entropy,
            stats.laplacian_std
        );

        self.classify(stats)
            .ok_or_else(|| PixtraceError::Analysis(format!("entropy {} matched no band", stats.entropy)))
    }
}
