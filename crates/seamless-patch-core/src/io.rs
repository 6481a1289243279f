use image::{GrayImage, ImageFormat, ImageReader, RgbaImage};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Decodes an image (format sniffed from content) and converts it to RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

/// Writes `img` as PNG, creating missing parent directories first.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Writes a single-channel mask as 8-bit grayscale PNG, creating parent directories.
pub fn save_mask_png(mask: &GrayImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    mask.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
