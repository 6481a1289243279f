use image::{GrayImage, Luma};
use tracing::debug;

use crate::config::FalloffMode;
use crate::error::{PatchError, Result};

/// Single-channel opacity buffer matching the buffered rectangle.
pub type AlphaMask = GrayImage;

/// Builds the soft blending mask for a buffered patch of `width x height`.
///
/// - Interior `(padding, padding, width - padding, height - padding)` is fully opaque
///   when it has positive area.
/// - Every other pixel gets an alpha derived from its edge distance (see [`FalloffMode`]);
///   with `padding == 0` that alpha is 255.
/// - The whole buffer is then Gaussian-blurred with `blur_radius` as sigma
///   (edge-clamped sampling); radius 0 skips the blur.
///
/// With [`FalloffMode::Literal`] the edge distance is always zero outside the interior,
/// so the pre-blur mask is uniformly 255.
pub fn create_soft_mask(
    width: u32,
    height: u32,
    padding: u32,
    blur_radius: u32,
    falloff: FalloffMode,
) -> Result<AlphaMask> {
    if width == 0 || height == 0 {
        return Err(PatchError::InvalidDimensions { width, height });
    }
    let p = padding as i64;
    let (cx1, cy1) = (p, p);
    let (cx2, cy2) = (width as i64 - p, height as i64 - p);

    let mut mask = GrayImage::new(width, height);
    if cx2 > cx1 && cy2 > cy1 {
        for y in cy1..cy2 {
            for x in cx1..cx2 {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }

    for (x, y, px) in mask.enumerate_pixels_mut() {
        if px[0] != 0 {
            continue;
        }
        let h_dist = edge_distance(x as i64, cx1, cx2, falloff);
        let v_dist = edge_distance(y as i64, cy1, cy2, falloff);
        let min_dist = h_dist.max(v_dist).clamp(0, p);
        px[0] = falloff_alpha(min_dist, p);
    }

    debug!(width, height, padding, blur_radius, ?falloff, "mask synthesized");
    if blur_radius == 0 {
        return Ok(mask);
    }
    Ok(gaussian_blur_gray(&mask, blur_radius as f32))
}

/// Distance of coordinate `c` from the interior span `[lo, hi)` along one axis.
fn edge_distance(c: i64, lo: i64, hi: i64, falloff: FalloffMode) -> i64 {
    if c >= lo && c < hi {
        return 0;
    }
    match falloff {
        FalloffMode::Literal => {
            // Only one side is populated; the other stays 0, so the min is always 0.
            let (before, after) = if c < lo { (lo - c, 0) } else { (0, c - (hi - 1)) };
            before.min(after)
        }
        FalloffMode::Linear => (lo - c).max(c - (hi - 1)).max(0),
    }
}

fn falloff_alpha(dist: i64, padding: i64) -> u8 {
    if padding == 0 {
        return 255;
    }
    let a = 255.0 * (1.0 - dist as f64 / padding as f64);
    a.round().clamp(0.0, 255.0) as u8
}

/// Normalized 1D Gaussian kernel spanning `ceil(3 * sigma)` taps on each side.
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let half = (sigma * 3.0).ceil() as i64;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }
    kernel
}

/// Separable Gaussian blur of a single-channel buffer. Samples past the border
/// repeat the nearest edge pixel.
pub fn gaussian_blur_gray(src: &GrayImage, sigma: f32) -> GrayImage {
    let (w, h) = src.dimensions();
    if sigma <= 0.0 || w == 0 || h == 0 {
        return src.clone();
    }
    let kernel = gaussian_kernel_1d(sigma);
    let half = (kernel.len() / 2) as i64;
    let (wi, hi) = (w as i64, h as i64);

    // horizontal
    let raw = src.as_raw();
    let mut temp = vec![0.0f32; (w * h) as usize];
    for y in 0..hi {
        let row = (y * wi) as usize;
        for x in 0..wi {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = (x + ki as i64 - half).clamp(0, wi - 1);
                sum += raw[row + sx as usize] as f32 * kv;
            }
            temp[row + x as usize] = sum;
        }
    }

    // vertical
    let mut out = GrayImage::new(w, h);
    for y in 0..hi {
        for x in 0..wi {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = (y + ki as i64 - half).clamp(0, hi - 1);
                sum += temp[(sy * wi + x) as usize] * kv;
            }
            out.put_pixel(x as u32, y as u32, Luma([sum.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}
