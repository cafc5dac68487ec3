//! Application state shared by all handlers.

use imgdrop_core::UploadConfig;
use imgdrop_processing::UploadValidator;
use imgdrop_storage::LocalStorage;

/// Immutable per-process state, handed to handlers as `State<Arc<AppState>>`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: UploadConfig,
    pub storage: LocalStorage,
    pub validator: UploadValidator,
}

impl AppState {
    pub fn new(config: UploadConfig) -> Self {
        let storage = LocalStorage::new(config.upload_dir.clone(), config.upload_dir_mode);
        let validator = UploadValidator::images(config.max_upload_bytes);

        Self {
            config,
            storage,
            validator,
        }
    }
}
