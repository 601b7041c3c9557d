//! Signal producers — one independent, parallelizable producer per signal

pub mod format;
pub mod exif;
pub mod jpeg;
pub mod frequency;
pub mod noise;
pub mod noise_consistency;

use super::pipeline::SignalProducer;
use crate::policy::ForensicPolicy;

/// Build every producer in registration order. Each carries its own slice
/// of the policy.
pub fn build_producers(policy: &ForensicPolicy) -> Vec<Box<dyn SignalProducer>> {
    vec![
        Box::new(format::FormatProducer::new(policy.format.clone())),
        Box::new(exif::ExifProducer::new(policy.exif.clone())),
        Box::new(jpeg::JpegProducer::new(policy.jpeg.clone())),
        Box::new(frequency::FrequencyProducer::new(policy.frequency.clone())),
        Box::new(noise::NoiseProducer::new(policy.noise.clone())),
        Box::new(noise_consistency::NoiseConsistencyProducer::new(policy.patches.clone())),
    ]
}

/// Luma plane as row-major `f32`
pub(crate) fn luma_plane(img: &image::GrayImage) -> Vec<f32> {
    img.as_raw().iter().map(|&p| p as f32).collect()
}
