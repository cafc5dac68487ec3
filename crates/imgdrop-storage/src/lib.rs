//! imgdrop storage library
//!
//! Persists accepted uploads into a single local directory.
//!
//! # Key format
//!
//! A storage key is a bare file name, `<unix-time-nanos><ext>`, where `ext` is
//! the extension of the client-supplied filename (for example
//! `1718031234567891234.png`). Keys never contain path separators or `..`.
//! Key generation lives in the `keys` module.

mod error;
pub mod keys;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use keys::{generate_storage_key, original_extension};
pub use local::{LocalStorage, StoredFile};
