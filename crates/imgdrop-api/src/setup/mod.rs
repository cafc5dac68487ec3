//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use imgdrop_core::UploadConfig;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: UploadConfig) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        mode = %config.mode,
        max_upload_bytes = config.max_upload_bytes,
        body_limit = config.body_limit(),
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let state = Arc::new(AppState::new(config));
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
