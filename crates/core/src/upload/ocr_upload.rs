use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::detection::domain::text_grouper::TextGrouping;
use crate::detection::domain::text_locator::TextLocator;
use crate::detection::domain::text_recognizer::{OcrDetection, RecognitionService};
use crate::shared::error::{PrivacyError, UploadError};

const DEFAULT_SUFFIX: &str = ".png";

/// An image file received from a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// One recognized region, in upload-image pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OcrBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub confidence: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OcrBody {
    Text {
        text: String,
        lines: Vec<String>,
    },
    Boxes {
        boxes: Vec<OcrBox>,
    },
    Error {
        error: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Transport-neutral reply; `status` is an HTTP status code.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OcrResponse {
    pub ok: bool,
    pub status: u16,
    #[serde(flatten)]
    pub body: OcrBody,
}

impl OcrResponse {
    fn success(body: OcrBody) -> Self {
        Self {
            ok: true,
            status: 200,
            body,
        }
    }

    /// Reply for an upload refused before OCR: `413` when it is too large,
    /// `400` otherwise.
    pub fn rejected(e: UploadError) -> Self {
        let status = match e {
            UploadError::TooLarge => 413,
            UploadError::Missing | UploadError::Empty => 400,
        };
        Self {
            ok: false,
            status,
            body: OcrBody::Error {
                error: e.tag(),
                message: None,
            },
        }
    }

    /// Maps an engine error onto its `500` reply.
    pub fn failed(e: &PrivacyError) -> Self {
        let (error, message) = match e {
            PrivacyError::EngineUnavailable { .. } => ("ocr-not-installed", None),
            PrivacyError::EngineInit { .. } => ("ocr-not-initialized", None),
            other => ("ocr-failed", Some(other.to_string())),
        };
        Self {
            ok: false,
            status: 500,
            body: OcrBody::Error { error, message },
        }
    }
}

/// Runs OCR on uploaded images through the shared recognizer.
pub struct OcrUploadService {
    locator: TextLocator,
}

impl OcrUploadService {
    pub fn new(recognizer: Arc<dyn RecognitionService>) -> Self {
        Self {
            locator: TextLocator::new(recognizer),
        }
    }

    /// Validates the upload, recognizes its text, and reports either the
    /// joined text with its lines or, with `detail`, one box per line.
    ///
    /// The upload is staged in a temporary file that is removed on every
    /// path out of this function.
    pub fn read_text(&self, upload: Option<UploadedImage>, detail: bool) -> OcrResponse {
        let upload = match validate(upload) {
            Ok(upload) => upload,
            Err(e) => {
                log::info!("Rejected upload: {e}");
                return OcrResponse::rejected(e);
            }
        };

        match self.recognize(&upload) {
            Ok(detections) if detail => OcrResponse::success(OcrBody::Boxes {
                boxes: detections.into_iter().filter_map(to_box).collect(),
            }),
            Ok(detections) => {
                let lines: Vec<String> = detections.into_iter().map(|d| d.text).collect();
                OcrResponse::success(OcrBody::Text {
                    text: join_lines(&lines),
                    lines,
                })
            }
            Err(e) => {
                log::warn!("OCR failed for '{}': {e}", upload.filename);
                OcrResponse::failed(&e)
            }
        }
    }

    fn recognize(&self, upload: &UploadedImage) -> Result<Vec<OcrDetection>, PrivacyError> {
        let mut staged = tempfile::Builder::new()
            .prefix("docprivacy-upload-")
            .suffix(&temp_suffix(&upload.filename))
            .tempfile()?;
        staged.write_all(&upload.bytes)?;
        staged.flush()?;

        log::debug!(
            "Staged {} byte upload at {}",
            upload.bytes.len(),
            staged.path().display()
        );
        self.locator.read(staged.path(), TextGrouping::lines())
    }
}

fn validate(upload: Option<UploadedImage>) -> Result<UploadedImage, UploadError> {
    let upload = upload.ok_or(UploadError::Missing)?;
    if upload.filename.is_empty() || upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    Ok(upload)
}

/// The upload's extension, so decoders can sniff the format; `.png` otherwise.
fn temp_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_SUFFIX.to_string())
}

fn join_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_box(detection: OcrDetection) -> Option<OcrBox> {
    let rect = detection.bounds()?;
    Some(OcrBox {
        x: rect.x(),
        y: rect.y(),
        width: rect.width(),
        height: rect.height(),
        text: detection.text,
        confidence: detection.confidence,
    })
}
