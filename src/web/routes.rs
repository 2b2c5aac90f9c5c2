//! REST API routes for the web server
//!
//! Provides the cover validation endpoint and a health check.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::COVER_FIELD;
use crate::cover::{AnalysisReport, CoverAnalyzer, TextDetector};
use crate::input::{allowed_file, sanitize_filename, CoverLoader, InputError};

const MSG_NO_FILE_PART: &str = "No file part in the request";
const MSG_INVALID_FILE: &str = "Invalid or no file selected";
const MSG_PDF_FAILED: &str = "Could not process the PDF file.";
const MSG_LOAD_FAILED: &str = "Failed to load image for analysis.";
const MSG_ANALYSIS_FAILED: &str = "An internal error occurred during analysis.";

/// Application state shared across handlers
pub struct AppState {
    pub analyzer: CoverAnalyzer<Box<dyn TextDetector>>,
    pub loader: CoverLoader,
    /// Directory for the per-request upload copies
    pub upload_dir: PathBuf,
    pub version: String,
}

impl AppState {
    pub fn new(
        analyzer: CoverAnalyzer<Box<dyn TextDetector>>,
        loader: CoverLoader,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            analyzer,
            loader,
            upload_dir,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", post(validate_cover))
        .route("/health", get(health_check))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
    pub tools: ToolStatus,
}

#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub tesseract: bool,
    pub pdftoppm: bool,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tools = ToolStatus {
        tesseract: which::which("tesseract").is_ok(),
        pdftoppm: which::which("pdftoppm").is_ok(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        engine: state.analyzer.detector().name().to_string(),
        tools,
    })
}

/// Report plus the sanitized name of the uploaded file
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    pub filename: String,
}

/// Validate an uploaded cover
async fn validate_cover(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ValidationResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "request is not multipart");
        AppError::BadRequest(MSG_NO_FILE_PART.to_string())
    })?;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(COVER_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((name, data.to_vec()));
    }

    let (original_name, data) =
        upload.ok_or_else(|| AppError::BadRequest(MSG_NO_FILE_PART.to_string()))?;

    let filename = sanitize_filename(&original_name)
        .filter(|name| allowed_file(name))
        .ok_or_else(|| AppError::BadRequest(MSG_INVALID_FILE.to_string()))?;

    let request_id = Uuid::new_v4();
    info!(%request_id, filename = %filename, bytes = data.len(), "cover upload received");

    let upload_file = save_upload(&state.upload_dir, &filename, &data).map_err(|e| {
        error!(%request_id, error = %e, "failed to store upload");
        AppError::Internal(MSG_ANALYSIS_FAILED.to_string())
    })?;

    let worker_state = Arc::clone(&state);
    let response = tokio::task::spawn_blocking(move || {
        let result = process_upload(&worker_state, upload_file.path(), &filename, request_id);
        // Upload copy is deleted here on success and failure alike
        drop(upload_file);
        result
    })
    .await
    .map_err(|e| {
        error!(%request_id, error = %e, "analysis task panicked");
        AppError::Internal(MSG_ANALYSIS_FAILED.to_string())
    })??;

    Ok(Json(response))
}

/// Copy the upload into a temporary file that is removed on drop
fn save_upload(
    dir: &Path,
    filename: &str,
    data: &[u8],
) -> std::io::Result<tempfile::NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let suffix = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

fn process_upload(
    state: &AppState,
    path: &Path,
    filename: &str,
    request_id: Uuid,
) -> Result<ValidationResponse, AppError> {
    let cover = state.loader.load_named(path, filename).map_err(|e| {
        warn!(%request_id, error = %e, "failed to load cover");
        AppError::from(e)
    })?;

    let report = state.analyzer.analyze(&cover.image).map_err(|e| {
        error!(%request_id, error = %e, "analysis failed");
        AppError::Internal(MSG_ANALYSIS_FAILED.to_string())
    })?;

    info!(%request_id, status = %report.status, score = report.confidence_score, "cover validated");

    Ok(ValidationResponse {
        report,
        filename: cover.filename,
    })
}

/// API error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        if err.is_bad_input() {
            AppError::BadRequest(MSG_INVALID_FILE.to_string())
        } else if err.is_render_failure() {
            AppError::Internal(MSG_PDF_FAILED.to_string())
        } else {
            AppError::Internal(MSG_LOAD_FAILED.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
