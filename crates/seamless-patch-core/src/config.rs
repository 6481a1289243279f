use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How the buffer-zone alpha is derived before blurring.
///   - `Literal` reproduces the historical edge-distance rule, which takes the
///     minimum of a one-sided distance and a structurally zero counterpart and
///     therefore leaves the whole buffer zone opaque; only the blur softens the seam.
///   - `Linear` uses the distance to the nearest interior edge, fading to zero
///     at the outer edge of the padding. Changes output relative to stored sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FalloffMode {
    #[default]
    Literal,
    Linear,
}

impl FromStr for FalloffMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "linear" | "gradient" => Ok(Self::Linear),
            _ => Err(()),
        }
    }
}

/// Options for blending an edited patch back into its source image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BlendConfig {
    /// Gaussian blur radius applied to the mask. `None` means "same as padding".
    #[serde(default)]
    pub blur_radius: Option<u32>,
    /// Buffer-zone falloff rule.
    #[serde(default)]
    pub falloff: FalloffMode,
}

/// Largest accepted mask blur radius; the kernel spans `6 * radius + 1` taps.
pub const MAX_BLUR_RADIUS: u32 = 1024;

impl BlendConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if an explicit `blur_radius` exceeds [`MAX_BLUR_RADIUS`].
    /// The padding-derived default is checked by [`BlendConfig::validate_for`].
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(r) = self.blur_radius {
            check_blur_radius(r)?;
        }
        Ok(())
    }

    /// Like [`BlendConfig::validate`], but for the radius used with a crop made with `padding`.
    pub fn validate_for(&self, padding: u32) -> crate::error::Result<()> {
        self.validate()?;
        check_blur_radius(self.effective_blur_radius(padding))
    }

    /// Blur radius actually used for a crop made with `padding`.
    pub fn effective_blur_radius(&self, padding: u32) -> u32 {
        self.blur_radius.unwrap_or(padding)
    }

    pub fn builder() -> BlendConfigBuilder {
        BlendConfigBuilder::default()
    }
}

fn check_blur_radius(r: u32) -> crate::error::Result<()> {
    if r > MAX_BLUR_RADIUS {
        return Err(crate::error::PatchError::InvalidConfig(format!(
            "blur_radius ({r}) exceeds the maximum of {MAX_BLUR_RADIUS}"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct BlendConfigBuilder {
    cfg: BlendConfig,
}

impl BlendConfigBuilder {
    pub fn blur_radius(mut self, v: Option<u32>) -> Self {
        self.cfg.blur_radius = v;
        self
    }
    pub fn falloff(mut self, v: FalloffMode) -> Self {
        self.cfg.falloff = v;
        self
    }
    pub fn build(self) -> BlendConfig {
        self.cfg
    }
}

/// Directory roots shared by the prepare and blend steps.
///
/// Stored sessions depend on the exact file names produced here:
/// - original: `<originals>/<image>.png`
/// - patch: `<patches>/<image>/<session>.png`
/// - metadata: `<patches>/<image>/<session>_meta.json`
/// - edited patch: `<edited>/<image>/<session>_edited.png`
/// - result: `<outputs>/<image>/<session>_result.png`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceLayout {
    #[serde(default = "default_originals_root")]
    pub originals_root: PathBuf,
    #[serde(default = "default_patches_root")]
    pub patches_root: PathBuf,
    #[serde(default = "default_edited_root")]
    pub edited_root: PathBuf,
    #[serde(default = "default_outputs_root")]
    pub outputs_root: PathBuf,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self {
            originals_root: default_originals_root(),
            patches_root: default_patches_root(),
            edited_root: default_edited_root(),
            outputs_root: default_outputs_root(),
        }
    }
}

impl WorkspaceLayout {
    /// All four roots placed under a single base directory using the default names.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            originals_root: base.join("originals"),
            patches_root: base.join("patches"),
            edited_root: base.join("edited_patches"),
            outputs_root: base.join("outputs"),
        }
    }

    pub fn original_image(&self, image_name: &str) -> PathBuf {
        self.originals_root.join(format!("{image_name}.png"))
    }

    pub fn patch_dir(&self, image_name: &str) -> PathBuf {
        self.patches_root.join(image_name)
    }

    pub fn patch_path(&self, image_name: &str, session: &str) -> PathBuf {
        self.patch_dir(image_name).join(format!("{session}.png"))
    }

    pub fn metadata_path(&self, image_name: &str, session: &str) -> PathBuf {
        self.patch_dir(image_name).join(format!("{session}_meta.json"))
    }

    pub fn edited_dir(&self, image_name: &str) -> PathBuf {
        self.edited_root.join(image_name)
    }

    pub fn edited_patch_path(&self, image_name: &str, session: &str) -> PathBuf {
        self.edited_dir(image_name).join(format!("{session}_edited.png"))
    }

    pub fn output_dir(&self, image_name: &str) -> PathBuf {
        self.outputs_root.join(image_name)
    }

    pub fn output_path(&self, image_name: &str, session: &str) -> PathBuf {
        self.output_dir(image_name).join(format!("{session}_result.png"))
    }

    pub fn builder() -> WorkspaceLayoutBuilder {
        WorkspaceLayoutBuilder::default()
    }
}

/// Image identifier derived from a path (file stem).
pub fn image_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn default_originals_root() -> PathBuf {
    PathBuf::from("data/originals")
}
fn default_patches_root() -> PathBuf {
    PathBuf::from("data/patches")
}
fn default_edited_root() -> PathBuf {
    PathBuf::from("data/edited_patches")
}
fn default_outputs_root() -> PathBuf {
    PathBuf::from("data/outputs")
}

#[derive(Debug, Default, Clone)]
pub struct WorkspaceLayoutBuilder {
    layout: WorkspaceLayout,
}

impl WorkspaceLayoutBuilder {
    pub fn originals_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.layout.originals_root = v.into();
        self
    }
    pub fn patches_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.layout.patches_root = v.into();
        self
    }
    pub fn edited_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.layout.edited_root = v.into();
        self
    }
    pub fn outputs_root(mut self, v: impl Into<PathBuf>) -> Self {
        self.layout.outputs_root = v.into();
        self
    }
    pub fn build(self) -> WorkspaceLayout {
        self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_session_convention() {
        let l = WorkspaceLayout::default();
        assert_eq!(
            l.original_image("portrait"),
            PathBuf::from("data/originals/portrait.png")
        );
        assert_eq!(
            l.patch_path("portrait", "sky_birds"),
            PathBuf::from("data/patches/portrait/sky_birds.png")
        );
        assert_eq!(
            l.metadata_path("portrait", "sky_birds"),
            PathBuf::from("data/patches/portrait/sky_birds_meta.json")
        );
        assert_eq!(
            l.edited_patch_path("portrait", "sky_birds"),
            PathBuf::from("data/edited_patches/portrait/sky_birds_edited.png")
        );
        assert_eq!(
            l.output_path("portrait", "sky_birds"),
            PathBuf::from("data/outputs/portrait/sky_birds_result.png")
        );
    }

    #[test]
    fn falloff_parses() {
        assert_eq!("LITERAL".parse::<FalloffMode>(), Ok(FalloffMode::Literal));
        assert_eq!("linear".parse::<FalloffMode>(), Ok(FalloffMode::Linear));
        assert!("smooth".parse::<FalloffMode>().is_err());
    }

    #[test]
    fn validate_rejects_oversized_blur() {
        assert!(BlendConfig::default().validate().is_ok());
        let cfg = BlendConfig::builder().blur_radius(Some(MAX_BLUR_RADIUS)).build();
        assert!(cfg.validate().is_ok());
        let cfg = BlendConfig::builder().blur_radius(Some(MAX_BLUR_RADIUS + 1)).build();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Value);
        // default radius follows the padding
        assert!(BlendConfig::default().validate_for(MAX_BLUR_RADIUS + 1).is_err());
        let cfg = BlendConfig::builder().blur_radius(Some(4)).build();
        assert!(cfg.validate_for(MAX_BLUR_RADIUS + 1).is_ok());
    }

    #[test]
    fn blur_radius_defaults_to_padding() {
        assert_eq!(BlendConfig::default().effective_blur_radius(20), 20);
        let cfg = BlendConfig::builder().blur_radius(Some(3)).build();
        assert_eq!(cfg.effective_blur_radius(20), 3);
    }
}
