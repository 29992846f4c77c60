//! Local HTTP shell: the OCR upload endpoint plus the built frontend.

use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

use docprivacy_core::shared::error::{PrivacyError, UploadError};
use docprivacy_core::upload::ocr_upload::{OcrResponse, OcrUploadService, UploadedImage};

const IMAGE_FIELD: &str = "image";
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    uploads: Arc<OcrUploadService>,
}

impl AppState {
    pub fn new(uploads: OcrUploadService) -> Self {
        Self {
            uploads: Arc::new(uploads),
        }
    }
}

#[derive(Debug, Serialize)]
struct Hello {
    message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct OcrQuery {
    #[serde(default)]
    detail: bool,
}

pub fn router(state: AppState, frontend_dir: &Path) -> Router {
    router_with_upload_limit(state, frontend_dir, MAX_UPLOAD_BYTES)
}

/// Unknown paths get `index.html` so client-side routes resolve.
fn router_with_upload_limit(state: AppState, frontend_dir: &Path, max_upload: usize) -> Router {
    let index = frontend_dir.join("index.html");
    let frontend = ServeDir::new(frontend_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/api/hello", get(hello))
        .route("/api/ocr", post(ocr))
        .layer(DefaultBodyLimit::max(max_upload))
        .fallback_service(frontend)
        .with_state(state)
}

async fn hello() -> Json<Hello> {
    Json(Hello {
        message: "Hello from docprivacy backend!",
    })
}

async fn ocr(
    State(state): State<AppState>,
    Query(query): Query<OcrQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<OcrResponse>) {
    let upload = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(upload) => upload,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                log::warn!("Rejected upload: {e}");
                return reply(OcrResponse::rejected(UploadError::TooLarge));
            }
            Err(e) => {
                log::warn!("Rejected multipart body: {e}");
                None
            }
        },
        Err(e) => {
            log::warn!("Rejected non-multipart request: {e}");
            None
        }
    };

    let uploads = state.uploads.clone();
    let response = tokio::task::spawn_blocking(move || uploads.read_text(upload, query.detail))
        .await
        .unwrap_or_else(|e| {
            OcrResponse::failed(&PrivacyError::EngineFailed {
                engine: "ocr worker",
                reason: e.to_string(),
            })
        });
    reply(response)
}

/// First `image` field of the form; other fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedImage>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(UploadedImage::new(filename, bytes.to_vec())));
    }
    Ok(None)
}

fn reply(response: OcrResponse) -> (StatusCode, Json<OcrResponse>) {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    log::info!("Serving on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}
