use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::error::{PatchError, Result};

/// Brings an edited patch back to the buffered-region size.
///
/// A patch that already has the target size is returned as-is. Otherwise it is
/// stretched with a Lanczos3 filter; aspect ratio is not preserved.
pub fn resample_patch(patch: RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(PatchError::InvalidDimensions { width, height });
    }
    if patch.dimensions() == (width, height) {
        return Ok(patch);
    }
    debug!(
        from_w = patch.width(),
        from_h = patch.height(),
        to_w = width,
        to_h = height,
        "resampling edited patch"
    );
    Ok(imageops::resize(&patch, width, height, FilterType::Lanczos3))
}
