use image::{GrayImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::config::BlendConfig;
use crate::error::{PatchError, Result};
use crate::extract::extract_region;
use crate::io::{load_rgba, save_png};
use crate::mask::create_soft_mask;
use crate::metadata::CropRecord;
use crate::model::BBox;
use crate::resample::resample_patch;

/// `fg * m/255 + bg * (1 - m/255)`, rounded. Exact for `fg == bg` and for `m` in {0, 255}.
#[inline]
fn mix(fg: u8, bg: u8, m: u8) -> u8 {
    let m = m as u32;
    ((fg as u32 * m + bg as u32 * (255 - m) + 127) / 255) as u8
}

#[inline]
fn mix_px(fg: &Rgba<u8>, bg: &Rgba<u8>, m: u8) -> Rgba<u8> {
    Rgba([
        mix(fg[0], bg[0], m),
        mix(fg[1], bg[1], m),
        mix(fg[2], bg[2], m),
        mix(fg[3], bg[3], m),
    ])
}

/// Blend `patch` over `original` per channel using `mask` as the patch weight.
/// All three buffers must share the same dimensions.
pub fn blend_regions(patch: &RgbaImage, original: &RgbaImage, mask: &GrayImage) -> Result<RgbaImage> {
    let (w, h) = patch.dimensions();
    if original.dimensions() != (w, h) || mask.dimensions() != (w, h) {
        return Err(PatchError::InvalidGeometry(format!(
            "blend inputs differ in size: patch {}x{}, original {}x{}, mask {}x{}",
            w,
            h,
            original.width(),
            original.height(),
            mask.width(),
            mask.height()
        )));
    }
    Ok(RgbaImage::from_fn(w, h, |x, y| {
        mix_px(patch.get_pixel(x, y), original.get_pixel(x, y), mask.get_pixel(x, y)[0])
    }))
}

/// Paste `region` into `canvas` at (dx, dy) with `mask` as opacity.
/// Pixels where the mask is 0, or that fall outside the canvas, are left untouched.
pub fn paste_with_mask(canvas: &mut RgbaImage, region: &RgbaImage, dx: u32, dy: u32, mask: &GrayImage) {
    let (cw, ch) = canvas.dimensions();
    let (rw, rh) = region.dimensions();
    for yy in 0..rh.min(mask.height()) {
        for xx in 0..rw.min(mask.width()) {
            let m = mask.get_pixel(xx, yy)[0];
            if m == 0 || dx + xx >= cw || dy + yy >= ch {
                continue;
            }
            let bg = *canvas.get_pixel(dx + xx, dy + yy);
            let px = mix_px(region.get_pixel(xx, yy), &bg, m);
            canvas.put_pixel(dx + xx, dy + yy, px);
        }
    }
}

/// Blend an edited patch into a copy of `original` at `bbox`.
///
/// The patch is resampled to the bbox size if needed, a soft mask is synthesized for
/// `padding`, the masked blend of patch and original region is computed, and the
/// blended region is pasted back with the same mask as opacity.
pub fn composite_patch(
    original: &RgbaImage,
    patch: RgbaImage,
    bbox: BBox,
    padding: u32,
    cfg: &BlendConfig,
) -> Result<RgbaImage> {
    cfg.validate_for(padding)?;
    let (iw, ih) = original.dimensions();
    if !bbox.fits_within(iw, ih) {
        return Err(PatchError::InvalidGeometry(format!(
            "buffered bbox {bbox} exceeds image bounds {iw}x{ih}"
        )));
    }
    let (pw, ph) = bbox.dimensions();
    let patch = resample_patch(patch, pw, ph)?;
    let mask = create_soft_mask(
        pw,
        ph,
        padding,
        cfg.effective_blur_radius(padding),
        cfg.falloff,
    )?;
    let region = extract_region(original, bbox);
    let blended = blend_regions(&patch, &region, &mask)?;

    let mut result = original.clone();
    paste_with_mask(&mut result, &blended, bbox.x1, bbox.y1, &mask);
    debug!(%bbox, padding, "patch composited");
    Ok(result)
}

#[instrument(skip_all, fields(out = %out_path.display()))]
/// Decode `original_path` and `edited_patch_path`, composite using `record`, and
/// write the full-size result to `out_path` as PNG. The file is only written
/// once the whole result is assembled.
pub fn blend_patch_back(
    original_path: &Path,
    edited_patch_path: &Path,
    record: &CropRecord,
    out_path: &Path,
    cfg: &BlendConfig,
) -> Result<PathBuf> {
    let original = load_rgba(original_path)?;
    let edited = load_rgba(edited_patch_path)?;
    let result = composite_patch(&original, edited, record.buffered_bbox, record.padding, cfg)?;
    save_png(&result, out_path)?;
    info!(width = result.width(), height = result.height(), "result written");
    Ok(out_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_is_exact_at_extremes() {
        for v in [0u8, 1, 77, 200, 255] {
            assert_eq!(mix(v, v, 133), v);
            assert_eq!(mix(v, 9, 255), v);
            assert_eq!(mix(9, v, 0), v);
        }
        assert_eq!(mix(255, 0, 128), 128);
    }

    #[test]
    fn paste_skips_zero_mask() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        let region = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 255]));
        let mut mask = GrayImage::new(2, 2);
        mask.put_pixel(1, 1, image::Luma([255]));
        paste_with_mask(&mut canvas, &region, 1, 1, &mask);
        assert_eq!(canvas.get_pixel(1, 1).0, [10, 10, 10, 255]);
        assert_eq!(canvas.get_pixel(2, 2).0, [200, 0, 0, 255]);
    }
}
