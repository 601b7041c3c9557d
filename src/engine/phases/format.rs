//! Format consistency — declared extension vs sniffed container

use crate::engine::pipeline::SignalProducer;
use crate::ingest::detector::ImageFormat;
use crate::ingest::ImageInput;
use crate::policy::FormatPolicy;
use crate::signal::{Polarity, Signal};
use crate::PixResult;

pub struct FormatProducer {
    policy: FormatPolicy,
}

impl FormatProducer {
    pub fn new(policy: FormatPolicy) -> Self {
        Self { policy }
    }
}

impl SignalProducer for FormatProducer {
    fn name(&self) -> &str {
        "format"
    }

    fn label(&self) -> &str {
        "Format"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Suspicion
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        let detected = input.format.detected_format;
        let declared = input.format.canonical_extension();
        tracing::debug!("Format: declared '{}', detected {}", declared, detected);

        // Unknown first: a mismatch against "unknown" says nothing new
        if detected == ImageFormat::Unknown {
            return Ok(self.policy.unknown.signal());
        }
        if declared != detected.as_str() {
            return Ok(self.policy.mismatch.signal());
        }
        if detected.is_uncommon_for_capture() {
            let outcome = &self.policy.uncommon;
            return Ok(Signal::scored(
                outcome.score,
                outcome.confidence,
                format!("{} ({})", outcome.reason, detected),
            ));
        }
        Ok(self.policy.consistent.signal())
    }
}
