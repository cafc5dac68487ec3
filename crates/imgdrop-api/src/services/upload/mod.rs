//! Upload pipeline
//!
//! collect parts → check size → sniff content → rewind → ensure directory → write

mod service;
mod types;

pub use service::UploadService;
pub use types::UploadStage;
