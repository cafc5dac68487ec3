//! imgdrop core library
//!
//! Configuration, error taxonomy and constants shared by the processing,
//! storage and API crates.

pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used types
pub use config::{UploadConfig, UploadMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
