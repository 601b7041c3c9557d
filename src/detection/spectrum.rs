//! Frequency-domain energy of the luma plane
//!
//! 2-D FFT as row transforms then column transforms. Magnitudes are
//! normalized by their maximum, the low-frequency disc around the (shifted)
//! spectrum center is zeroed, and the mean over the whole spectrum is the
//! high-frequency energy statistic.

use image::GrayImage;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Mean normalized magnitude outside a disc of radius
/// `min(h/2, w/2) / radius_divisor`. `None` for an empty image.
pub fn high_frequency_energy(img: &GrayImage, radius_divisor: u32) -> Option<f64> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 || radius_divisor == 0 {
        return None;
    }

    let mut buf: Vec<Complex<f64>> = img
        .as_raw()
        .iter()
        .map(|&p| Complex::new(p as f64, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();

    // Rows: the buffer is a sequence of `h` rows of length `w`
    planner.plan_fft_forward(w).process(&mut buf);

    // Columns: transpose, transform rows of length `h`, transpose back
    let mut cols = transpose(&buf, w, h);
    planner.plan_fft_forward(h).process(&mut cols);
    let spectrum = transpose(&cols, h, w);

    let magnitude: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
    let max = magnitude.iter().cloned().fold(0.0f64, f64::max);
    let scale = 1.0 / (max + 1e-8);

    let (cy, cx) = (h / 2, w / 2);
    let radius = (cy.min(cx) as u32 / radius_divisor) as i64;
    let r2 = radius * radius;

    let mut sum = 0.0;
    for y in 0..h {
        // Position after fftshift
        let sy = ((y + h / 2) % h) as i64 - cy as i64;
        for x in 0..w {
            let sx = ((x + w / 2) % w) as i64 - cx as i64;
            if sx * sx + sy * sy <= r2 {
                continue;
            }
            sum += magnitude[y * w + x] * scale;
        }
    }

    Some(sum / (w * h) as f64)
}

fn transpose(data: &[Complex<f64>], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}
