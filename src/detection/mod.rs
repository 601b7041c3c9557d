//! Statistic kernels — the numeric computations behind each signal
//!
//! Each kernel computes one statistic from bytes or pixels. Kernels know
//! nothing about bands or scores; producers in `engine::phases` map their
//! output onto policy tables.

pub mod residual;
pub mod spectrum;
pub mod exif_tags;
pub mod jpeg_markers;
pub mod patches;

pub use exif_tags::{ExifScan, read_exif_tags, tag_id};
pub use jpeg_markers::sof_dimensions;
pub use patches::patch_origins;
pub use spectrum::high_frequency_energy;
