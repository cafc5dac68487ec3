use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use imgdrop_core::constants::UPLOAD_SUCCESS_BODY;

use crate::error::HttpAppError;
use crate::services::upload::{UploadService, UploadStage};
use crate::state::AppState;

/// Upload handler
///
/// Accepts one (single mode) or more (multi mode) `file` parts and stores each
/// accepted PNG/JPEG in the uploads directory.
///
/// # Returns
/// 200 with `Upload successful` once every part is stored
///
/// # Errors
/// - `AppError::InvalidInput` - Not a multipart form, or no `file` part
/// - `AppError::PayloadTooLarge` - Body exceeds the configured cap
/// - `AppError::FileTooBig` - A part exceeds the per-file cap (multi mode)
/// - `AppError::UnsupportedFormat` - Content is not PNG or JPEG
/// - `AppError::EmptyFile` - A part carries no bytes
/// - `AppError::Io` - Directory creation or file write failed
#[tracing::instrument(
    skip(state, multipart),
    fields(mode = %state.config.mode, operation = "upload")
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let multipart = multipart?;

    let stored = UploadService::new(&state).upload(multipart).await?;

    tracing::info!(
        stage = %UploadStage::Responded,
        files = stored.len(),
        keys = ?stored.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
        "Upload successful"
    );

    Ok((StatusCode::OK, UPLOAD_SUCCESS_BODY))
}
