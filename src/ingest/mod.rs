//! Image ingestion — raw bytes plus a decoded luma plane
//!
//! The image is read and decoded once; every producer sees the same
//! read-only `ImageInput`. A decode failure is stored, not raised, so
//! byte-level producers (format, EXIF, JPEG) still run on undecodable input.

pub mod detector;

use crate::{PixResult, PixtraceError};
use detector::{FormatDetector, FormatInfo};
use image::GrayImage;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// One image under analysis
#[derive(Debug)]
pub struct ImageInput {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub format: FormatInfo,
    luma: Result<GrayImage, String>,
}

impl ImageInput {
    /// Read a file and detect its format with the given detector
    pub fn open(path: &Path, detector: &FormatDetector) -> PixResult<Self> {
        if !path.exists() {
            return Err(PixtraceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Image not found: {}", path.display()),
            )));
        }
        let bytes = std::fs::read(path)?;
        let format = detector.detect(path, &bytes);
        Ok(Self::from_parts(path.to_path_buf(), bytes, format))
    }

    /// Build from bytes and externally supplied capability metadata
    pub fn from_parts(path: PathBuf, bytes: Vec<u8>, format: FormatInfo) -> Self {
        let luma = image::load_from_memory(&bytes)
            .map(|img| img.to_luma8())
            .map_err(|e| e.to_string());
        if let Err(ref e) = luma {
            tracing::warn!("Decode failed for {}: {}", path.display(), e);
        }
        Self {
            path,
            bytes,
            format,
            luma,
        }
    }

    /// Build directly from an already-decoded luma plane
    pub fn from_luma(path: PathBuf, bytes: Vec<u8>, format: FormatInfo, luma: GrayImage) -> Self {
        Self {
            path,
            bytes,
            format,
            luma: Ok(luma),
        }
    }

    /// Decoded grayscale pixels, or the decode error
    pub fn luma(&self) -> PixResult<&GrayImage> {
        self.luma
            .as_ref()
            .map_err(|e| PixtraceError::Decode(e.clone()))
    }

    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ImageInput::open(Path::new("/nonexistent/img.png"), &FormatDetector::default());
        assert!(matches!(err, Err(PixtraceError::Io(_))));
    }

    #[test]
    fn test_undecodable_bytes_keep_decode_error() {
        let info = FormatInfo::for_format(detector::ImageFormat::Jpeg, "jpg", "JPEG magic bytes detected");
        let input = ImageInput::from_parts(PathBuf::from("broken.jpg"), vec![0xFF, 0xD8, 0xFF, 0x00], info);
        assert!(matches!(input.luma(), Err(PixtraceError::Decode(_))));
        assert_eq!(input.file_size(), 4);
        assert_eq!(input.sha256().len(), 64);
    }
}
