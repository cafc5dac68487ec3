//! Error types module
//!
//! All failures of the upload service are unified under [`AppError`]. Each
//! variant self-describes how it is presented over HTTP through
//! [`ErrorMetadata`]; crate-local errors (validation, storage) convert into it.

use std::io;

use crate::constants::METHOD_NOT_ALLOWED_BODY;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client errors worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNSUPPORTED_FORMAT")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method is not allowed")]
    MethodNotAllowed,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("File too big: {filename} (max: {max_mb} MB)")]
    FileTooBig { filename: String, max_mb: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported format: {detected}")]
    UnsupportedFormat { detected: String },

    #[error("Empty file: {filename}")]
    EmptyFile { filename: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MethodNotAllowed => (405, "METHOD_NOT_ALLOWED", false, LogLevel::Debug),
        // 400, not 413
        AppError::PayloadTooLarge(_) => (400, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::FileTooBig { .. } => (400, "FILE_TOO_BIG", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::UnsupportedFormat { .. } => (400, "UNSUPPORTED_FORMAT", false, LogLevel::Warn),
        AppError::EmptyFile { .. } => (400, "EMPTY_FILE", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Io(_) => (500, "IO_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MethodNotAllowed => "MethodNotAllowed",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::FileTooBig { .. } => "FileTooBig",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedFormat { .. } => "UnsupportedFormat",
            AppError::EmptyFile { .. } => "EmptyFile",
            AppError::NotFound(_) => "NotFound",
            AppError::Io(_) => "Io",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_BODY.to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::FileTooBig { filename, max_mb } => format!(
                "The uploaded image is too big: {}. Please use an image less than {}MB in size",
                filename, max_mb
            ),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnsupportedFormat { .. } => {
                "The provided file format is not allowed. Please upload a JPEG or PNG image"
                    .to_string()
            }
            AppError::EmptyFile { .. } => "The uploaded file is empty".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Io(ref err) => err.to_string(),
            AppError::Internal(ref msg) => msg.clone(),
        }
    }
}
