//! Health check handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use imgdrop_core::UploadMode;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
    pub upload_dir: String,
    pub mode: UploadMode,
}

/// Liveness probe - process is running.
pub async fn liveness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "alive",
            upload_dir: state.config.upload_dir.display().to_string(),
            mode: state.config.mode,
        }),
    )
}
