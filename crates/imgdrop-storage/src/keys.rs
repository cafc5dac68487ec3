//! Storage key generation.
//!
//! Key format: `<unix-time-nanos><ext>`, e.g. `1718031234567891234.jpg`.

use chrono::Utc;

const MAX_EXTENSION_LEN: usize = 16;

/// Extension of an untrusted client filename, including the leading dot.
///
/// Only the last path segment is considered (both `/` and `\` separate
/// segments). The extension keeps its original case. Anything that is not a
/// short run of ASCII alphanumerics after the final dot yields an empty
/// extension, so a key can never pick up separators or control characters.
pub fn original_extension(filename: &str) -> String {
    let name = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    let Some(dot) = name.rfind('.') else {
        return String::new();
    };

    let ext = &name[dot + 1..];
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return String::new();
    }

    format!(".{}", ext)
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Generate a storage key from a timestamp and an extension (with dot).
pub fn generate_storage_key(nanos: i64, extension: &str) -> String {
    format!("{}{}", nanos, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_extension_basic() {
        assert_eq!(original_extension("photo.jpg"), ".jpg");
        assert_eq!(original_extension("image.PNG"), ".PNG");
        assert_eq!(original_extension("archive.tar.gz"), ".gz");
    }

    #[test]
    fn test_original_extension_missing() {
        assert_eq!(original_extension("noextension"), "");
        assert_eq!(original_extension("trailingdot."), "");
        assert_eq!(original_extension(""), "");
    }

    #[test]
    fn test_original_extension_uses_last_path_segment() {
        assert_eq!(original_extension("../../etc/passwd"), "");
        assert_eq!(original_extension("dir.d/photo"), "");
        assert_eq!(original_extension("C:\\Users\\me\\cat.jpeg"), ".jpeg");
    }

    #[test]
    fn test_original_extension_rejects_unsafe_characters() {
        assert_eq!(original_extension("x.p\ng"), "");
        assert_eq!(original_extension("x.png "), "");
        assert_eq!(original_extension("x.averyveryverylongextension"), "");
    }

    #[test]
    fn test_filename_extension_is_kept_even_if_misleading() {
        // Naming follows the client filename, not the sniffed type.
        assert_eq!(original_extension("evil.txt"), ".txt");
    }

    #[test]
    fn test_generate_storage_key() {
        assert_eq!(generate_storage_key(1234567890, ".png"), "1234567890.png");
        assert_eq!(generate_storage_key(42, ""), "42");
    }

    #[test]
    fn test_now_nanos_is_nanosecond_scale() {
        assert!(now_nanos() > 1_600_000_000_000_000_000);
    }
}
