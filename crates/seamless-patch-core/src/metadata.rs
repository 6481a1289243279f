use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PatchError, Result};
use crate::io::ensure_parent_dir;
use crate::model::BBox;

/// Everything the blend step needs to know about a crop made earlier.
/// Field names are the on-disk compatibility surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropRecord {
    pub source_image: PathBuf,
    /// Requested region `[x1, y1, x2, y2]`.
    pub original_bbox: BBox,
    /// Padded region that was actually cropped.
    pub buffered_bbox: BBox,
    pub padding: u32,
    #[serde(default)]
    pub patch_path: PathBuf,
    /// Where the externally edited patch is expected. Older records may omit it.
    #[serde(default)]
    pub edited_patch_path: Option<PathBuf>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub session_name: String,
}

impl CropRecord {
    /// Checks the containment invariant between the two rectangles.
    pub fn validate(&self) -> Result<()> {
        if !self.buffered_bbox.contains(&self.original_bbox) {
            return Err(PatchError::Metadata(format!(
                "buffered_bbox {} does not contain original_bbox {}",
                self.buffered_bbox, self.original_bbox
            )));
        }
        Ok(())
    }
}

/// Write `record` as pretty JSON (2-space indent), creating parent directories.
pub fn save_crop_metadata(record: &CropRecord, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a record written by [`save_crop_metadata`] (or by older tooling).
pub fn load_crop_metadata(path: &Path) -> Result<CropRecord> {
    let text = fs::read_to_string(path)?;
    let record: CropRecord = serde_json::from_str(&text)?;
    record.validate()?;
    Ok(record)
}
