use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Edited patch not found: {}", .0.display())]
    MissingEditedPatch(PathBuf),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Metadata error: {0}")]
    Metadata(String),
    #[error("Metadata error: {0}")]
    MetadataJson(#[from] serde_json::Error),
}

/// Coarse classification used by callers that only care about the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Image could not be decoded/written, or an expected file is absent.
    Io,
    /// Degenerate geometry or dimensions.
    Value,
    /// Crop record missing a required field or malformed.
    Metadata,
}

impl PatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatchError::Io(_) | PatchError::Image(_) | PatchError::MissingEditedPatch(_) => {
                ErrorKind::Io
            }
            PatchError::InvalidDimensions { .. }
            | PatchError::InvalidGeometry(_)
            | PatchError::InvalidConfig(_) => {
                ErrorKind::Value
            }
            PatchError::Metadata(_) | PatchError::MetadataJson(_) => ErrorKind::Metadata,
        }
    }
}

pub type Result<T> = std::result::Result<T, PatchError>;
