use image::RgbaImage;
use image::imageops;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{PatchError, Result};
use crate::io::{load_rgba, save_png};
use crate::model::BBox;

/// Buffered rectangle for `inner` grown by `padding`, clamped to an image of `size`.
///
/// `inner` must lie fully inside the image; that is checked before clamping.
/// With `padding == 0` the result equals `inner`.
pub fn compute_buffered_bbox(inner: BBox, padding: u32, size: (u32, u32)) -> Result<BBox> {
    let (width, height) = size;
    if !inner.fits_within(width, height) {
        return Err(PatchError::InvalidGeometry(format!(
            "region {inner} is not inside the {width}x{height} image"
        )));
    }
    Ok(inner.padded_within(padding, width, height))
}

/// Copy of the pixels under `bbox`. The caller guarantees `bbox` fits in `src`.
pub fn extract_region(src: &RgbaImage, bbox: BBox) -> RgbaImage {
    imageops::crop_imm(src, bbox.x1, bbox.y1, bbox.width(), bbox.height()).to_image()
}

#[instrument(skip_all, fields(src = %image_path.display(), inner = %inner, padding = padding))]
/// Crop `inner` plus `padding` out of the image at `image_path` and write it to
/// `out_path` as RGBA PNG. Returns the buffered rectangle that was cropped.
pub fn crop_with_buffer(
    image_path: &Path,
    inner: BBox,
    padding: u32,
    out_path: &Path,
) -> Result<BBox> {
    let img = load_rgba(image_path)?;
    let bbox = compute_buffered_bbox(inner, padding, img.dimensions())?;
    let patch = extract_region(&img, bbox);
    save_png(&patch, out_path)?;
    debug!(%bbox, w = patch.width(), h = patch.height(), "patch cropped");
    Ok(bbox)
}
