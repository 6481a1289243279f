use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::compositing::blend_patch_back;
use crate::config::{BlendConfig, WorkspaceLayout, image_name_of};
use crate::error::{PatchError, Result};
use crate::extract::crop_with_buffer;
use crate::metadata::{CropRecord, load_crop_metadata, save_crop_metadata};
use crate::model::BBox;

/// Input of the prepare step.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    /// Image identifier; resolves to `<originals>/<image_name>.png`.
    pub image_name: String,
    pub inner: BBox,
    pub padding: u32,
    pub session_name: String,
    pub description: String,
}

/// Result of the prepare step: the persisted record and where it was written.
#[derive(Debug, Clone)]
pub struct PreparedPatch {
    pub record: CropRecord,
    pub metadata_path: PathBuf,
}

#[instrument(skip_all, fields(image = %req.image_name, session = %req.session_name))]
/// Crop the padded region out of the original, create the directories the
/// external editor and the blend step will use, and persist the crop record.
pub fn prepare_patch(layout: &WorkspaceLayout, req: &PrepareRequest) -> Result<PreparedPatch> {
    let source_image = layout.original_image(&req.image_name);
    // patches are keyed by the original's file stem, edits and outputs by the image name
    let stem = image_name_of(&source_image);
    let patch_path = layout.patch_path(&stem, &req.session_name);
    let metadata_path = layout.metadata_path(&stem, &req.session_name);
    let edited_patch_path = layout.edited_patch_path(&req.image_name, &req.session_name);

    fs::create_dir_all(layout.patch_dir(&stem))?;
    fs::create_dir_all(layout.edited_dir(&req.image_name))?;
    fs::create_dir_all(layout.output_dir(&req.image_name))?;

    let buffered_bbox = crop_with_buffer(&source_image, req.inner, req.padding, &patch_path)?;
    info!(
        %buffered_bbox,
        w = buffered_bbox.width(),
        h = buffered_bbox.height(),
        "patch cropped"
    );

    let record = CropRecord {
        source_image,
        original_bbox: req.inner,
        buffered_bbox,
        padding: req.padding,
        patch_path,
        edited_patch_path: Some(edited_patch_path),
        description: req.description.clone(),
        session_name: req.session_name.clone(),
    };
    save_crop_metadata(&record, &metadata_path)?;
    info!(path = %metadata_path.display(), "metadata saved");

    Ok(PreparedPatch {
        record,
        metadata_path,
    })
}

#[instrument(skip_all, fields(image = %image_name, session = %session_name))]
/// Load the session's crop record, locate the edited patch and blend it into the
/// original. Returns the path of the written result.
pub fn blend_result(
    layout: &WorkspaceLayout,
    image_name: &str,
    session_name: &str,
    cfg: &BlendConfig,
) -> Result<PathBuf> {
    let stem = image_name_of(&layout.original_image(image_name));
    let metadata_path = layout.metadata_path(&stem, session_name);
    let record = load_crop_metadata(&metadata_path)?;
    info!(path = %metadata_path.display(), "metadata loaded");

    let edited_patch_path = match &record.edited_patch_path {
        Some(p) if !p.as_os_str().is_empty() => p.clone(),
        _ => layout.edited_patch_path(image_name, session_name),
    };
    if !edited_patch_path.is_file() {
        return Err(PatchError::MissingEditedPatch(edited_patch_path));
    }
    let out_path = layout.output_path(image_name, session_name);
    info!(
        source = %record.source_image.display(),
        edited = %edited_patch_path.display(),
        description = %record.description,
        "blending edited patch"
    );
    blend_patch_back(
        &record.source_image,
        &edited_patch_path,
        &record,
        &out_path,
        cfg,
    )
}
