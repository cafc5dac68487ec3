//! imgdrop processing library
//!
//! Magic-byte content sniffing and the validation gate every uploaded part must
//! pass before it is allowed anywhere near storage.

pub mod sniff;
pub mod validator;

pub use sniff::{sniff, sniff_and_rewind, DetectedType};
pub use validator::{UploadValidator, ValidationError};
