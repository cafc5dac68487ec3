//! Startup checks beyond what `UploadConfig::validate` covers.

use anyhow::Result;
use imgdrop_core::UploadConfig;

/// Validate configuration against the filesystem
///
/// An existing non-directory at the uploads path would make every upload fail,
/// so it is rejected here. A missing index page only disables `GET /`.
pub fn validate_config(config: &UploadConfig) -> Result<()> {
    config.validate()?;

    if config.upload_dir.exists() && !config.upload_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "UPLOAD_DIR {} exists but is not a directory",
            config.upload_dir.display()
        ));
    }

    if !config.index_path.is_file() {
        tracing::warn!(
            index_path = %config.index_path.display(),
            "Index page not found; GET / will return 404"
        );
    }

    if config.is_production() && config.upload_dir_mode & 0o002 != 0 {
        tracing::warn!(
            upload_dir_mode = %format_args!("{:o}", config.upload_dir_mode),
            "Uploads directory will be world-writable"
        );
    }

    Ok(())
}
