//! Patch tiling — fixed-size, fixed-stride overlapping tiles

use image::GrayImage;

/// Top-left origins of every full patch. Empty when the image is smaller
/// than one patch along either axis, or when size/stride is zero.
pub fn patch_origins(width: u32, height: u32, size: u32, stride: u32) -> Vec<(u32, u32)> {
    if size == 0 || stride == 0 || width < size || height < size {
        return Vec::new();
    }
    let mut origins = Vec::new();
    for y in (0..=height - size).step_by(stride as usize) {
        for x in (0..=width - size).step_by(stride as usize) {
            origins.push((x, y));
        }
    }
    origins
}

/// Copy one square patch out as a row-major `f32` plane
pub fn extract_patch(img: &GrayImage, x: u32, y: u32, size: u32) -> Vec<f32> {
    let mut out = Vec::with_capacity((size * size) as usize);
    for py in y..y + size {
        for px in x..x + size {
            out.push(img.get_pixel(px, py)[0] as f32);
        }
    }
    out
}
