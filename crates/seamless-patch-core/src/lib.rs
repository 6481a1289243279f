//! Core library for region-based image editing with seamless reintegration.
//!
//! - Extraction: `crop_with_buffer` cuts a padded, bounds-clamped region for external editing
//! - Mask: `create_soft_mask` builds a blurred opacity mask for the buffered region
//! - Compositing: `composite_patch` resamples the edited patch if needed and blends it back
//! - Pipeline: `prepare_patch` / `blend_result` are the two entry points, sharing a `CropRecord`
//!
//! Quick example:
//! ```ignore
//! use seamless_patch_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let layout = WorkspaceLayout::default();
//! let req = PrepareRequest {
//!     image_name: "portrait".into(),
//!     inner: BBox::new(40, 40, 400, 350)?,
//!     padding: 50,
//!     session_name: "sky_birds".into(),
//!     description: "Add birds to sky".into(),
//! };
//! let prepared = prepare_patch(&layout, &req)?;
//! // ... edit prepared.record.patch_path externally, save to edited_patch_path ...
//! let out = blend_result(&layout, "portrait", "sky_birds", &BlendConfig::default())?;
//! println!("result: {}", out.display());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod mask;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod resample;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use extract::*;
pub use io::{load_rgba, save_mask_png, save_png};
pub use mask::*;
pub use metadata::*;
pub use model::*;
pub use pipeline::*;
pub use resample::*;

/// Convenience prelude for common types and functions.
/// Importing `seamless_patch_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{BlendConfig, BlendConfigBuilder, FalloffMode, WorkspaceLayout};
    pub use crate::error::{ErrorKind, PatchError};
    pub use crate::metadata::CropRecord;
    pub use crate::model::BBox;
    pub use crate::{
        PrepareRequest, PreparedPatch, blend_result, composite_patch, create_soft_mask,
        crop_with_buffer, prepare_patch, resample_patch,
    };
}
