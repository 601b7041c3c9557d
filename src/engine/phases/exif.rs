//! EXIF completeness — coverage of an expected camera tag set

use crate::detection::{exif_tags, read_exif_tags, ExifScan};
use crate::engine::pipeline::SignalProducer;
use crate::ingest::ImageInput;
use crate::policy::ExifPolicy;
use crate::signal::{Polarity, Signal};
use crate::{PixResult, PixtraceError};

pub struct ExifProducer {
    policy: ExifPolicy,
    expected: Vec<u16>,
}

impl ExifProducer {
    pub fn new(policy: ExifPolicy) -> Self {
        // Unknown names are rejected by policy validation; skip them here
        let expected = policy
            .expected_tags
            .iter()
            .filter_map(|name| {
                let id = exif_tags::tag_id(name);
                if id.is_none() {
                    tracing::warn!("EXIF: unknown tag name '{}' dropped from expected set", name);
                }
                id
            })
            .collect();
        Self { policy, expected }
    }

    /// Fraction of expected tags present
    pub fn coverage(&self, scan: &ExifScan) -> f64 {
        match scan {
            ExifScan::NoMetadata => 0.0,
            ExifScan::Tags(tags) if !self.expected.is_empty() => {
                let present = self.expected.iter().filter(|&&id| tags.contains(&id)).count();
                present as f64 / self.expected.len() as f64
            }
            ExifScan::Tags(_) => 0.0,
        }
    }
}

impl SignalProducer for ExifProducer {
    fn name(&self) -> &str {
        "exif"
    }

    fn label(&self) -> &str {
        "EXIF"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Authenticity
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        if !input.format.exif_supported {
            return Ok(Signal::not_applicable("EXIF not supported for detected format"));
        }

        let scan = read_exif_tags(&input.bytes).map_err(PixtraceError::Analysis)?;
        if scan == ExifScan::NoMetadata {
            return Ok(self.policy.no_metadata.signal());
        }

        let coverage = self.coverage(&scan);
        tracing::debug!("EXIF: coverage {:.3} of {} expected tags", coverage, self.expected.len());

        self.policy
            .coverage
            .classify(coverage)
            .map(|band| band.signal())
            .ok_or_else(|| PixtraceError::Analysis(format!("coverage {} matched no band", coverage)))
    }
}
