//! Service-wide constants.

/// Multipart field name carrying uploaded files.
pub const FILE_FIELD: &str = "file";

/// Number of leading bytes inspected when sniffing a part's content type.
pub const SNIFF_LEN: usize = 512;

/// Body returned for a successful upload.
pub const UPLOAD_SUCCESS_BODY: &str = "Upload successful";

/// Body returned for any method other than the route's own.
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method is not allowed";

/// MIME types accepted by the upload route.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg"];

pub const BYTES_PER_MB: usize = 1024 * 1024;
