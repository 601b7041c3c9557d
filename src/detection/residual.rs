//! Noise residuals — what is left after removing low-frequency content
//!
//! The residual is `pixel - gaussian_blur_5x5(pixel)`. Borders use
//! reflect-101 (`dcb|abcd|cba`) so edge pixels are not biased toward zero.

/// Binomial approximation of a 5-tap Gaussian (σ ≈ 1.1)
const GAUSS_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Reflect-101 index into `0..n`
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    // Loop handles kernels wider than the plane
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Separable 5×5 Gaussian blur of a row-major plane
pub fn gaussian_blur_5x5(data: &[f32], width: usize, height: usize) -> Vec<f32> {
    debug_assert_eq!(data.len(), width * height);
    let mut horiz = vec![0.0f32; data.len()];
    for y in 0..height {
        let row = &data[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in GAUSS_5.iter().enumerate() {
                acc += w * row[reflect(x as isize + k as isize - 2, width)];
            }
            horiz[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0f32; data.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, w) in GAUSS_5.iter().enumerate() {
                acc += w * horiz[reflect(y as isize + k as isize - 2, height) * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// High-pass residual. With `quantize`, the blurred plane is rounded to
/// integers first, matching an 8-bit blur.
pub fn blur_residual(data: &[f32], width: usize, height: usize, quantize: bool) -> Vec<f32> {
    let blurred = gaussian_blur_5x5(data, width, height);
    data.iter()
        .zip(blurred)
        .map(|(&p, b)| if quantize { p - b.round() } else { p - b })
        .collect()
}

/// 4-neighbour Laplacian (`[0 1 0; 1 -4 1; 0 1 0]`)
pub fn laplacian(data: &[f32], width: usize, height: usize) -> Vec<f64> {
    let at = |x: isize, y: isize| -> f64 {
        data[reflect(y, height) * width + reflect(x, width)] as f64
    };
    let mut out = Vec::with_capacity(data.len());
    for y in 0..height as isize {
        for x in 0..width as isize {
            let v = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            out.push(v);
        }
    }
    out
}

/// Population standard deviation; `None` for an empty slice
pub fn std_dev<T: Copy + Into<f64>>(values: &[T]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v.into()).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| {
            let d = v.into() - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Some(var.sqrt())
}

/// Shannon entropy (nats) of the residual's density histogram after
/// min-max normalization into [0, 1]. `None` for an empty residual.
pub fn normalized_entropy(residual: &[f32], bins: usize) -> Option<f64> {
    if residual.is_empty() || bins == 0 {
        return None;
    }
    let (min, max) = residual
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = (max - min) as f64 + 1e-8;

    let mut counts = vec![0u64; bins];
    for &v in residual {
        let norm = (v - min) as f64 / span;
        let idx = ((norm * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    // Density histogram with a small floor, renormalized to a distribution
    let n = residual.len() as f64;
    let density: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * bins as f64 / n + 1e-8)
        .collect();
    let total: f64 = density.iter().sum();
    let entropy = density
        .iter()
        .map(|d| {
            let p = d / total;
            -p * p.ln()
        })
        .sum();
    Some(entropy)
}
