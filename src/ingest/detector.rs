//! Image format detector — identifies the container from magic bytes
//!
//! Produces the capability metadata the signal producers trust: whether the
//! detected format can carry EXIF, JPEG compression signals, and block
//! artifacts. The signature table is injected so tests can swap it.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image container identified from header bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Tiff,
    Bmp,
    Unknown,
}

impl ImageFormat {
    /// Canonical lowercase name, also used for extension comparison
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Unknown => "unknown",
        }
    }

    /// Canonical format name for a file extension, folding aliases
    pub fn canonical_extension(ext: &str) -> String {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpe" | "jfif" => "jpeg".to_string(),
            "tif" => "tiff".to_string(),
            other => other.to_string(),
        }
    }

    pub fn exif_supported(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Tiff)
    }

    pub fn jpeg_signals_supported(&self) -> bool {
        matches!(self, Self::Jpeg)
    }

    pub fn block_artifacts_supported(&self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// Formats rarely written natively by camera pipelines
    pub fn is_uncommon_for_capture(&self) -> bool {
        matches!(self, Self::Webp | Self::Bmp)
    }

    /// Extensions worth picking up in a directory walk
    pub fn is_image_extension(ext: &str) -> bool {
        matches!(
            Self::canonical_extension(ext).as_str(),
            "jpeg" | "png" | "webp" | "tiff" | "bmp"
        )
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Capability Metadata ───────────────────────────────────────────

/// What the detected format supports, plus the declared extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Lowercased extension without the dot (aliases not folded)
    pub extension: String,
    pub detected_format: ImageFormat,
    pub exif_supported: bool,
    pub jpeg_signals_supported: bool,
    pub block_artifacts_supported: bool,
    pub reason: String,
}

impl FormatInfo {
    /// Capability metadata for a known format
    pub fn for_format(format: ImageFormat, extension: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            detected_format: format,
            exif_supported: format.exif_supported(),
            jpeg_signals_supported: format.jpeg_signals_supported(),
            block_artifacts_supported: format.block_artifacts_supported(),
            reason: reason.into(),
        }
    }

    /// Declared extension after alias folding (`jpg` → `jpeg`)
    pub fn canonical_extension(&self) -> String {
        ImageFormat::canonical_extension(&self.extension)
    }
}

// ─── Signature Table ───────────────────────────────────────────────

/// Magic-byte rule: header starts with `prefix`, and optionally contains
/// `marker` at `marker_offset`
#[derive(Debug, Clone, Copy)]
pub struct MagicSignature {
    pub format: ImageFormat,
    pub prefix: &'static [u8],
    pub marker: Option<(usize, &'static [u8])>,
    pub reason: &'static str,
}

/// Standard image container signatures, checked in order
pub const DEFAULT_SIGNATURES: &[MagicSignature] = &[
    MagicSignature { format: ImageFormat::Jpeg, prefix: &[0xFF, 0xD8, 0xFF], marker: None, reason: "JPEG magic bytes detected" },
    MagicSignature { format: ImageFormat::Png, prefix: &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], marker: None, reason: "PNG magic bytes detected" },
    MagicSignature { format: ImageFormat::Webp, prefix: b"RIFF", marker: Some((8, b"WEBP")), reason: "WEBP container detected" },
    MagicSignature { format: ImageFormat::Tiff, prefix: b"II*\x00", marker: None, reason: "TIFF magic bytes detected" },
    MagicSignature { format: ImageFormat::Tiff, prefix: b"MM\x00*", marker: None, reason: "TIFF magic bytes detected" },
    MagicSignature { format: ImageFormat::Bmp, prefix: b"BM", marker: None, reason: "BMP magic bytes detected" },
];

/// Bytes read from the file head for sniffing
pub const HEADER_LEN: usize = 16;

/// Sniffs image containers against an injected signature table
#[derive(Debug, Clone)]
pub struct FormatDetector {
    signatures: Vec<MagicSignature>,
}

impl FormatDetector {
    pub fn new(signatures: Vec<MagicSignature>) -> Self {
        Self { signatures }
    }

    /// Detect format from the header bytes
    pub fn sniff(&self, header: &[u8]) -> (ImageFormat, &'static str) {
        for sig in &self.signatures {
            if !header.starts_with(sig.prefix) {
                continue;
            }
            if let Some((offset, marker)) = sig.marker {
                let end = offset + marker.len();
                if header.len() < end || &header[offset..end] != marker {
                    continue;
                }
            }
            return (sig.format, sig.reason);
        }
        (ImageFormat::Unknown, "Unknown or unsupported image format")
    }

    /// Build capability metadata for a file from its path and leading bytes
    pub fn detect(&self, path: &Path, data: &[u8]) -> FormatInfo {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let header = &data[..data.len().min(HEADER_LEN)];
        let (format, reason) = self.sniff(header);
        tracing::debug!("Format sniff: {} → {} ({})", path.display(), format, reason);
        FormatInfo::for_format(format, extension, reason)
    }
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURES.to_vec())
    }
}
