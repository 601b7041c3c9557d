//! Frequency-domain naturalness — high-frequency spectral energy

use crate::detection::high_frequency_energy;
use crate::engine::pipeline::SignalProducer;
use crate::ingest::ImageInput;
use crate::policy::FrequencyPolicy;
use crate::signal::{Polarity, Signal};
use crate::{PixResult, PixtraceError};

pub struct FrequencyProducer {
    policy: FrequencyPolicy,
}

impl FrequencyProducer {
    pub fn new(policy: FrequencyPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(&self, energy: f64) -> Option<Signal> {
        self.policy.energy.classify(energy).map(|band| band.signal())
    }
}

impl SignalProducer for FrequencyProducer {
    fn name(&self) -> &str {
        "frequency"
    }

    fn label(&self) -> &str {
        "Frequency"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Authenticity
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        let luma = input.luma()?;
        let energy = high_frequency_energy(luma, self.policy.radius_divisor)
            .ok_or_else(|| PixtraceError::Analysis("empty image spectrum".into()))?;
        tracing::debug!("Frequency: high-frequency energy {:.4}", energy);

        self.classify(energy)
            .ok_or_else(|| PixtraceError::Analysis(format!("energy {} matched no band", energy)))
    }
}
