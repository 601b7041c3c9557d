//! Image discovery — one walk over a directory for batch analysis
//!
//! Files are picked by extension; container sniffing happens later per
//! file, so a mislabeled image is still analyzed (and flagged by the format
//! producer).

use crate::ingest::detector::ImageFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered candidate image
#[derive(Debug, Clone)]
pub struct IndexedImage {
    pub path: PathBuf,
    pub extension: String,
    pub size: u64,
}

/// Sorted list of candidate images under a root
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    images: Vec<IndexedImage>,
    total_bytes: u64,
}

impl ImageIndex {
    pub fn build(root: &Path) -> Self {
        let mut images = Vec::new();
        let mut total_bytes = 0u64;

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !ImageFormat::is_image_extension(&ext) {
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            total_bytes += size;
            images.push(IndexedImage {
                path: entry.path().to_path_buf(),
                extension: ext,
                size,
            });
        }

        // Stable report order regardless of walk order
        images.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!("Image index: {} candidates, {} bytes", images.len(), total_bytes);
        Self { images, total_bytes }
    }

    pub fn images(&self) -> &[IndexedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_image_extensions_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"xy").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/c.tif"), b"xyz").unwrap();

        let index = ImageIndex::build(dir.path());
        let names: Vec<_> = index
            .images()
            .iter()
            .map(|i| i.path.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.png", "b.JPG", "sub/c.tif"]);
        assert_eq!(index.total_bytes(), 6);
        assert_eq!(index.images()[1].extension, "jpg");
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageIndex::build(dir.path()).is_empty());
    }
}
