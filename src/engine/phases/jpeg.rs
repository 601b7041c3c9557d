//! JPEG compression profile — kilobytes per pixel

use crate::detection::sof_dimensions;
use crate::engine::pipeline::SignalProducer;
use crate::ingest::ImageInput;
use crate::policy::JpegPolicy;
use crate::signal::{Polarity, Signal};
use crate::{PixResult, PixtraceError};

pub struct JpegProducer {
    policy: JpegPolicy,
}

impl JpegProducer {
    pub fn new(policy: JpegPolicy) -> Self {
        Self { policy }
    }
}

/// File size in KB divided by pixel count
pub fn compression_ratio(file_size: u64, width: u32, height: u32) -> Option<f64> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 {
        return None;
    }
    Some(file_size as f64 / 1024.0 / pixels as f64)
}

impl SignalProducer for JpegProducer {
    fn name(&self) -> &str {
        "jpeg"
    }

    fn label(&self) -> &str {
        "JPEG"
    }

    fn polarity(&self) -> Polarity {
        Polarity::Authenticity
    }

    fn produce(&self, input: &ImageInput) -> PixResult<Signal> {
        if !input.format.jpeg_signals_supported {
            return Ok(Signal::not_applicable("JPEG compression analysis not applicable"));
        }

        // Header claims JPEG but carries no frame: not a real JPEG stream
        let Some((width, height)) = sof_dimensions(&input.bytes) else {
            return Ok(Signal::not_applicable("Image format mismatch (not true JPEG)"));
        };

        let ratio = compression_ratio(input.file_size(), width, height)
            .ok_or_else(|| PixtraceError::Analysis(format!("zero-area frame {}x{}", width, height)))?;
        tracing::debug!("JPEG: {}x{}, {:.5} KB/pixel", width, height, ratio);

        self.policy
            .compression
            .classify(ratio)
            .map(|band| band.signal())
            .ok_or_else(|| PixtraceError::Analysis(format!("ratio {} matched no band", ratio)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::jpeg_markers::tests::jpeg_header;
    use crate::ingest::detector::{FormatInfo, ImageFormat};
    use std::path::PathBuf;

    fn run(format: ImageFormat, bytes: Vec<u8>) -> PixResult<Signal> {
        let input = ImageInput::from_parts(
            PathBuf::from("img.jpg"),
            bytes,
            FormatInfo::for_format(format, "jpg", "test"),
        );
        JpegProducer::new(JpegPolicy::default()).produce(&input)
    }

    /// JPEG header padded to `kb` kilobytes
    fn sized(width: u16, height: u16, kb: f64) -> Vec<u8> {
        let mut d = jpeg_header(width, height, None);
        d.resize((kb * 1024.0) as usize, 0);
        d
    }

    #[test]
    fn test_not_applicable_for_non_jpeg() {
        let s = run(ImageFormat::Png, sized(100, 100, 10.0)).unwrap();
        assert_eq!(s.score, None);
        assert_eq!(s.reason, "JPEG compression analysis not applicable");
    }

    #[test]
    fn test_missing_frame_is_not_true_jpeg() {
        let s = run(ImageFormat::Jpeg, vec![0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        assert_eq!(s.score, None);
        assert_eq!(s.reason, "Image format mismatch (not true JPEG)");
    }

    #[test]
    fn test_camera_like_ratio() {
        // 50 KB over 10 000 pixels = 0.005 KB/pixel
        let s = run(ImageFormat::Jpeg, sized(100, 100, 50.0)).unwrap();
        assert_eq!((s.score, s.confidence), (Some(1.0), 0.85));
    }

    #[test]
    fn test_ratio_bands() {
        // 5 KB / 10 000 = 0.0005 → highly atypical
        assert_eq!(run(ImageFormat::Jpeg, sized(100, 100, 5.0)).unwrap().score, Some(0.3));
        // 15 KB / 10 000 = 0.0015 → slightly atypical
        assert_eq!(run(ImageFormat::Jpeg, sized(100, 100, 15.0)).unwrap().score, Some(0.6));
        // 120 KB / 10 000 = 0.012 → slightly atypical
        assert_eq!(run(ImageFormat::Jpeg, sized(100, 100, 120.0)).unwrap().score, Some(0.6));
        // 200 KB / 10 000 = 0.02 → highly atypical
        assert_eq!(run(ImageFormat::Jpeg, sized(100, 100, 200.0)).unwrap().score, Some(0.3));
    }

    #[test]
    fn test_ratio_boundary_goes_to_lower_band() {
        let ratio = compression_ratio(1024, 100, 10).unwrap();
        assert_eq!(ratio, 0.001);
        let band = JpegPolicy::default().compression.classify(ratio).unwrap().clone();
        assert_eq!(band.reason, "JPEG compression highly atypical");
    }

    #[test]
    fn test_zero_area_frame_is_failure() {
        assert!(run(ImageFormat::Jpeg, jpeg_header(0, 480, None)).is_err());
        assert_eq!(compression_ratio(100, 0, 10), None);
    }
}
