use std::io::ErrorKind;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use imgdrop_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Serve the static upload page
#[tracing::instrument(skip(state), fields(index_path = %state.config.index_path.display()))]
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    match tokio::fs::read(&state.config.index_path).await {
        Ok(body) => Ok((
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound("404 page not found".to_string()).into())
        }
        Err(e) => Err(AppError::Io(e).into()),
    }
}
