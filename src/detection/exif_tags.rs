//! EXIF tag presence — walks the TIFF IFD structure
//!
//! Collects tag IDs from IFD0 and the Exif sub-IFD. Values are not decoded;
//! only presence matters for coverage. The TIFF block is taken from a JPEG
//! APP1 `Exif\0\0` segment, or from the file itself for TIFF containers.

use super::jpeg_markers::Segments;
use std::collections::BTreeSet;

const EXIF_IFD_POINTER: u16 = 0x8769;
const GPS_IFD_POINTER: u16 = 0x8825;
const MAX_IFD_ENTRIES: usize = 1024;

/// Tag names understood in policy, with their numeric IDs
pub const KNOWN_TAGS: &[(&str, u16)] = &[
    ("ImageWidth", 0x0100),
    ("ImageLength", 0x0101),
    ("ImageDescription", 0x010E),
    ("Make", 0x010F),
    ("Model", 0x0110),
    ("Orientation", 0x0112),
    ("XResolution", 0x011A),
    ("YResolution", 0x011B),
    ("Software", 0x0131),
    ("DateTime", 0x0132),
    ("Artist", 0x013B),
    ("Copyright", 0x8298),
    ("ExposureTime", 0x829A),
    ("FNumber", 0x829D),
    ("ISOSpeedRatings", 0x8827),
    ("DateTimeOriginal", 0x9003),
    ("DateTimeDigitized", 0x9004),
    ("FocalLength", 0x920A),
    ("MakerNote", 0x927C),
    ("ExifImageWidth", 0xA002),
    ("ExifImageHeight", 0xA003),
    ("LensModel", 0xA434),
];

/// Numeric ID for a tag name
pub fn tag_id(name: &str) -> Option<u16> {
    KNOWN_TAGS.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

/// Result of looking for EXIF metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExifScan {
    /// No EXIF block, or a block with no tags
    NoMetadata,
    /// Tag IDs found across IFD0 and the Exif/GPS sub-IFDs
    Tags(BTreeSet<u16>),
}

/// Locate and walk the EXIF block. `Err` when a block exists but is malformed.
pub fn read_exif_tags(data: &[u8]) -> Result<ExifScan, String> {
    let tiff = if data.starts_with(b"II*\x00") || data.starts_with(b"MM\x00*") {
        Some(data)
    } else {
        Segments::new(data)
            .find(|s| s.marker == 0xE1 && s.payload.starts_with(b"Exif\0\0"))
            .map(|s| &s.payload[6..])
    };

    let Some(tiff) = tiff else {
        return Ok(ExifScan::NoMetadata);
    };

    let tags = walk_tiff(tiff)?;
    if tags.is_empty() {
        Ok(ExifScan::NoMetadata)
    } else {
        Ok(ExifScan::Tags(tags))
    }
}

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16(self, b: &[u8]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes([b[0], b[1]]),
            Self::Big => u16::from_be_bytes([b[0], b[1]]),
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            Self::Big => u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
        }
    }
}

fn walk_tiff(tiff: &[u8]) -> Result<BTreeSet<u16>, String> {
    if tiff.len() < 8 {
        return Err("EXIF block shorter than TIFF header".into());
    }
    let order = match &tiff[..2] {
        b"II" => ByteOrder::Little,
        b"MM" => ByteOrder::Big,
        _ => return Err("invalid TIFF byte-order mark".into()),
    };
    if order.u16(&tiff[2..4]) != 42 {
        return Err("invalid TIFF magic number".into());
    }

    let mut tags = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut pending = vec![order.u32(&tiff[4..8]) as usize];
    let mut first = true;

    while let Some(offset) = pending.pop() {
        if !visited.insert(offset) {
            continue;
        }
        match read_ifd(tiff, offset, order, &mut tags) {
            Ok(children) => pending.extend(children),
            // IFD0 must be readable; damaged sub-IFDs are tolerated
            Err(e) if first => return Err(e),
            Err(e) => tracing::debug!("Skipping damaged sub-IFD at {}: {}", offset, e),
        }
        first = false;
    }

    Ok(tags)
}

/// Reads one IFD into `tags`, returning offsets of sub-IFDs to follow
fn read_ifd(tiff: &[u8], offset: usize, order: ByteOrder, tags: &mut BTreeSet<u16>) -> Result<Vec<usize>, String> {
    if offset + 2 > tiff.len() {
        return Err(format!("IFD offset {} out of bounds", offset));
    }
    let count = order.u16(&tiff[offset..offset + 2]) as usize;
    if count > MAX_IFD_ENTRIES {
        return Err(format!("IFD entry count {} is implausible", count));
    }
    let end = offset + 2 + count * 12;
    if end > tiff.len() {
        return Err(format!("IFD at {} truncated ({} entries)", offset, count));
    }

    let mut children = Vec::new();
    for i in 0..count {
        let entry = &tiff[offset + 2 + i * 12..offset + 2 + (i + 1) * 12];
        let tag = order.u16(&entry[0..2]);
        tags.insert(tag);
        if tag == EXIF_IFD_POINTER || tag == GPS_IFD_POINTER {
            children.push(order.u32(&entry[8..12]) as usize);
        }
    }
    Ok(children)
}
