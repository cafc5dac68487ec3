//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p imgdrop-api`.

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use imgdrop_api::setup::routes;
use imgdrop_api::state::AppState;
use imgdrop_core::constants::BYTES_PER_MB;
use imgdrop_core::UploadConfig;
use tempfile::TempDir;

/// Test application: server plus the temp directory backing its uploads.
pub struct TestApp {
    pub server: TestServer,
    pub config: UploadConfig,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }

    /// Files currently in the uploads directory, sorted by name.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(self.upload_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// POST one `file` part to `/upload`.
    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> TestResponse {
        let form = MultipartForm::new().add_part("file", file_part(filename, data));
        self.server.post("/upload").multipart(form).await
    }
}

pub fn file_part(filename: &str, data: Vec<u8>) -> Part {
    Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type("application/octet-stream")
}

/// Multi mode, 1 MB per file, 4 MB per form.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {})
}

pub fn setup_test_app_with(customize: impl FnOnce(&mut UploadConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = UploadConfig {
        upload_dir: temp_dir.path().join("uploads"),
        index_path: temp_dir.path().join("index.html"),
        max_upload_bytes: BYTES_PER_MB,
        max_form_bytes: 4 * BYTES_PER_MB,
        ..UploadConfig::default()
    };
    customize(&mut config);

    let state = Arc::new(AppState::new(config.clone()));
    let app = routes::setup_routes(state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        config,
        _temp_dir: temp_dir,
    }
}
