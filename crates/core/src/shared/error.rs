use std::path::PathBuf;

use thiserror::Error;

/// Failures of the detection and redaction pipeline.
///
/// Each is reported at the boundary of the operation that needed the
/// resource; none is retried. Zero detections is not an error.
#[derive(Error, Debug)]
pub enum PrivacyError {
    #[error("could not load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("could not write image to {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{engine} is unavailable: {reason}")]
    EngineUnavailable { engine: &'static str, reason: String },
    #[error("{engine} could not be initialized: {reason}")]
    EngineInit { engine: &'static str, reason: String },
    #[error("{engine} failed: {reason}")]
    EngineFailed { engine: &'static str, reason: String },
    #[error("invalid upload: {0}")]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Rejected uploads, each with a stable machine-readable tag.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    #[error("no image was uploaded")]
    Missing,
    #[error("the uploaded image is empty")]
    Empty,
    #[error("the uploaded image exceeds the size limit")]
    TooLarge,
}

impl UploadError {
    pub fn tag(&self) -> &'static str {
        match self {
            UploadError::Missing => "missing-image",
            UploadError::Empty => "empty-image",
            UploadError::TooLarge => "image-too-large",
        }
    }
}
