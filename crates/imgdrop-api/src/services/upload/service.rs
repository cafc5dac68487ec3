//! Upload service
//!
//! Reads every `file` part of a multipart body, then validates and stores the
//! parts in order. A batch is all-or-nothing: when a part fails, the files
//! already written for the same request are deleted before the error is
//! returned.

use std::io::Cursor;

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::BytesMut;
use imgdrop_core::constants::{BYTES_PER_MB, FILE_FIELD};
use imgdrop_core::{AppError, UploadMode};
use imgdrop_processing::{sniff_and_rewind, ValidationError};
use imgdrop_storage::{original_extension, StoredFile};

use super::types::{UploadPart, UploadStage, ValidatedFile};
use crate::state::AppState;

pub struct UploadService<'a> {
    state: &'a AppState,
}

impl<'a> UploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Run the whole pipeline for one request
    pub async fn upload(&self, multipart: Multipart) -> Result<Vec<StoredFile>, AppError> {
        let parts = self.collect_parts(multipart).await?;
        self.store_all(parts).await
    }

    /// Validate and store `parts` in order, rolling back on the first failure
    pub async fn store_all(&self, parts: Vec<UploadPart>) -> Result<Vec<StoredFile>, AppError> {
        let mut stored = Vec::with_capacity(parts.len());

        for part in parts {
            match self.process_part(part).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.rollback(&stored).await;
                    return Err(e);
                }
            }
        }

        Ok(stored)
    }

    async fn collect_parts(&self, mut multipart: Multipart) -> Result<Vec<UploadPart>, AppError> {
        let mut parts = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.read_error(e))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            // Only file parts count; a plain text field named `file` is ignored.
            let Some(filename) = field.file_name().map(str::to_string) else {
                tracing::debug!("Skipping `file` field without a filename");
                continue;
            };

            if self.state.config.mode == UploadMode::Single && !parts.is_empty() {
                return Err(AppError::InvalidInput(
                    "Only one file can be uploaded per request".to_string(),
                ));
            }

            let data = self.read_part(field, &filename).await?;

            tracing::debug!(
                stage = %UploadStage::Received,
                filename = %filename,
                size_bytes = data.len(),
                "Received file part"
            );
            parts.push(UploadPart { filename, data });
        }

        if parts.is_empty() {
            return Err(AppError::InvalidInput("No file provided".to_string()));
        }

        Ok(parts)
    }

    /// Buffer one part. In multi mode the per-file cap is enforced while
    /// reading, so an oversized part is rejected without buffering all of it.
    async fn read_part(
        &self,
        mut field: Field<'_>,
        filename: &str,
    ) -> Result<bytes::Bytes, AppError> {
        let max = self.state.validator.max_file_size();
        let enforce_part_limit = self.state.config.mode == UploadMode::Multi;
        let mut buf = BytesMut::new();

        while let Some(chunk) = field.chunk().await.map_err(|e| self.read_error(e))? {
            let size = buf.len() + chunk.len();
            if enforce_part_limit && size > max {
                return Err(ValidationError::FileTooLarge {
                    filename: filename.to_string(),
                    size,
                    max,
                }
                .into());
            }
            buf.extend_from_slice(&chunk);
        }

        Ok(buf.freeze())
    }

    /// Body read failures: hitting the body cap is the size-limit error, anything
    /// else is reported with the parser's own text.
    fn read_error(&self, err: MultipartError) -> AppError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(format!(
                "The uploaded file is too big. Please choose a file that's less than {} MB in size",
                self.state.config.body_limit() / BYTES_PER_MB
            ))
        } else {
            AppError::InvalidInput(err.body_text())
        }
    }

    async fn process_part(&self, part: UploadPart) -> Result<StoredFile, AppError> {
        self.state
            .validator
            .validate_file_size(&part.filename, part.data.len())?;
        tracing::debug!(stage = %UploadStage::SizeChecked, filename = %part.filename, "Size accepted");

        let mut file = self.validate_content(part).await?;

        let storage = &self.state.storage;
        storage.ensure_dir().await?;
        tracing::debug!(
            stage = %UploadStage::DirectoryEnsured,
            upload_dir = %storage.base_path().display(),
            "Upload directory ready"
        );

        let stored = storage
            .store_stream(&file.extension, &mut file.source)
            .await?;
        tracing::debug!(
            stage = %UploadStage::Written,
            filename = %file.filename,
            detected = %file.detected,
            key = %stored.key,
            size_bytes = stored.size_bytes,
            "File stored"
        );

        Ok(stored)
    }

    /// Sniff the leading bytes and gate on the detected type. The source is
    /// handed back rewound to offset 0.
    async fn validate_content(&self, part: UploadPart) -> Result<ValidatedFile, AppError> {
        let mut source = Cursor::new(part.data);
        let (detected, _) = sniff_and_rewind(&mut source).await?;

        if let Err(e) = self.state.validator.validate_content_type(detected) {
            tracing::warn!(filename = %part.filename, detected = %detected, "Rejected upload");
            return Err(e.into());
        }
        tracing::debug!(stage = %UploadStage::ContentValidated, detected = %detected, "Content accepted");
        tracing::debug!(stage = %UploadStage::Rewound, position = source.position(), "Source rewound");

        Ok(ValidatedFile {
            source,
            extension: original_extension(&part.filename),
            filename: part.filename,
            detected,
        })
    }

    async fn rollback(&self, stored: &[StoredFile]) {
        if stored.is_empty() {
            return;
        }

        for file in stored {
            if let Err(e) = self.state.storage.delete(&file.key).await {
                tracing::warn!(error = %e, key = %file.key, "Failed to remove file during rollback");
            }
        }

        tracing::info!(removed = stored.len(), "Rolled back partially stored upload");
    }
}
