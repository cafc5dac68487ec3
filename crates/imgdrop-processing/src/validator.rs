use imgdrop_core::AppError;

use crate::sniff::DetectedType;

/// Validation errors for uploaded parts
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {filename} is {size} bytes (max: {max} bytes)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max: usize,
    },

    #[error("Content type not allowed: {detected} (allowed: {allowed:?})")]
    ContentTypeNotAllowed {
        detected: DetectedType,
        allowed: Vec<&'static str>,
    },

    #[error("Empty file: {0}")]
    EmptyFile(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { filename, max, .. } => AppError::FileTooBig {
                filename,
                max_mb: max / imgdrop_core::constants::BYTES_PER_MB,
            },
            ValidationError::ContentTypeNotAllowed { detected, .. } => {
                AppError::UnsupportedFormat {
                    detected: detected.mime().to_string(),
                }
            }
            ValidationError::EmptyFile(filename) => AppError::EmptyFile { filename },
        }
    }
}

/// Upload validator
///
/// Gates a part on its size and on the content type sniffed from its leading
/// bytes. The client-declared `Content-Type` of the part is never consulted.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_content_types: Vec<&'static str>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<&'static str>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    /// Validator accepting only PNG and JPEG up to `max_file_size` bytes.
    pub fn images(max_file_size: usize) -> Self {
        Self::new(
            max_file_size,
            imgdrop_core::constants::ALLOWED_CONTENT_TYPES.to_vec(),
        )
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate part size
    pub fn validate_file_size(&self, filename: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile(filename.to_string()));
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                filename: filename.to_string(),
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate sniffed content type
    pub fn validate_content_type(&self, detected: DetectedType) -> Result<(), ValidationError> {
        if !self.allowed_content_types.contains(&detected.mime()) {
            tracing::debug!(
                detected = %detected,
                "Rejected part with disallowed content type"
            );
            return Err(ValidationError::ContentTypeNotAllowed {
                detected,
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgdrop_core::ErrorMetadata;

    fn test_validator() -> UploadValidator {
        UploadValidator::images(1024 * 1024) // 1MB
    }

    #[test]
    fn test_validate_file_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_file_size("a.png", 512 * 1024).is_ok());
        assert!(validator.validate_file_size("a.png", 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = test_validator();
        let err = validator
            .validate_file_size("big.png", 1024 * 1024 + 1)
            .unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { ref filename, .. } if filename == "big.png"));
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size("empty.png", 0),
            Err(ValidationError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_validate_content_type_accepts_png_and_jpeg_only() {
        let validator = test_validator();
        assert!(validator.validate_content_type(DetectedType::Png).is_ok());
        assert!(validator.validate_content_type(DetectedType::Jpeg).is_ok());
        assert!(validator.validate_content_type(DetectedType::Gif).is_err());
        assert!(validator.validate_content_type(DetectedType::Webp).is_err());
        assert!(validator.validate_content_type(DetectedType::Unknown).is_err());
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let validator = test_validator();

        let too_big: AppError = validator
            .validate_file_size("big.jpg", 2 * 1024 * 1024)
            .unwrap_err()
            .into();
        assert_eq!(too_big.http_status_code(), 400);
        assert!(too_big.client_message().contains("big.jpg"));

        let wrong_type: AppError = validator
            .validate_content_type(DetectedType::Unknown)
            .unwrap_err()
            .into();
        assert_eq!(wrong_type.http_status_code(), 400);
        assert_eq!(wrong_type.error_code(), "UNSUPPORTED_FORMAT");
    }
}
