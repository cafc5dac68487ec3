use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::{StorageError, StorageResult};
use crate::keys::{generate_storage_key, now_nanos};

const MAX_NAME_ATTEMPTS: u32 = 8;

/// A file persisted in the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Local filesystem storage rooted at one uploads directory
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    dir_mode: u32,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// The directory is not touched here; it is created on demand by
    /// [`LocalStorage::ensure_dir`] before each write.
    ///
    /// # Arguments
    /// * `base_path` - Uploads directory (e.g., "./uploads")
    /// * `dir_mode` - Permission bits used when the directory is created (unix)
    pub fn new(base_path: impl Into<PathBuf>, dir_mode: u32) -> Self {
        LocalStorage {
            base_path: base_path.into(),
            dir_mode,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Create the uploads directory and any missing parents. Idempotent.
    pub async fn ensure_dir(&self) -> StorageResult<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(self.dir_mode);
        #[cfg(not(unix))]
        let _ = self.dir_mode;

        match builder.create(&self.base_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.base_path.is_dir() => Ok(()),
            Err(source) => Err(StorageError::CreateDir {
                path: self.base_path.clone(),
                source,
            }),
        }
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.contains('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Create a new, not previously existing file named `<nanos><extension>`.
    ///
    /// Files are opened with `create_new`, so an existing upload is never
    /// overwritten. On a name clash the timestamp is bumped and retried.
    async fn create_unique(&self, extension: &str) -> StorageResult<(String, PathBuf, fs::File)> {
        let nanos = now_nanos();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let key = generate_storage_key(nanos.saturating_add(attempt as i64), extension);
            let path = self.key_to_path(&key)?;

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((key, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(key = %key, attempt, "Storage key already taken, retrying");
                }
                Err(source) => return Err(StorageError::Create { path, source }),
            }
        }

        Err(StorageError::NameExhausted {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    /// Copy everything `reader` yields into a freshly named file.
    ///
    /// The uploads directory must already exist (see [`LocalStorage::ensure_dir`]).
    /// If the copy fails after the destination was created, the partial file is
    /// removed on a best-effort basis.
    pub async fn store_stream<R>(&self, extension: &str, reader: &mut R) -> StorageResult<StoredFile>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let start = std::time::Instant::now();
        let (key, path, mut file) = self.create_unique(extension).await?;

        let copied = async {
            let bytes = tokio::io::copy(reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(bytes)
        }
        .await;

        let size_bytes = match copied {
            Ok(bytes) => bytes,
            Err(source) => {
                drop(file);
                if let Err(cleanup_err) = fs::remove_file(&path).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        path = %path.display(),
                        "Failed to remove partially written upload"
                    );
                }
                return Err(StorageError::Write { path, source });
            }
        };

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredFile {
            key,
            path,
            size_bytes,
        })
    }

    /// Delete a stored file. Deleting a missing key is not an error.
    pub async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %storage_key, path = %path.display(), "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Delete { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::tempdir;
    use tokio::io::ReadBuf;

    /// Yields some bytes, then fails.
    struct FailingReader {
        sent: bool,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            if self.sent {
                Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "client went away",
                )))
            } else {
                self.sent = true;
                buf.put_slice(b"partial");
                Poll::Ready(Ok(()))
            }
        }
    }

    #[tokio::test]
    async fn test_store_stream_into_nested_directory() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("nested").join("uploads");
        let storage = LocalStorage::new(&uploads, 0o755);
        storage.ensure_dir().await.unwrap();

        let data = b"\x89PNG\r\n\x1a\nrest".to_vec();
        let stored = storage
            .store_stream(".png", &mut Cursor::new(data.clone()))
            .await
            .unwrap();

        assert!(stored.key.ends_with(".png"));
        assert_eq!(stored.path, uploads.join(&stored.key));
        assert_eq!(stored.size_bytes, data.len() as u64);
        assert_eq!(std::fs::read(&stored.path).unwrap(), data);
    }

    #[tokio::test]
    async fn test_sequential_uploads_get_distinct_keys() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), 0o755);

        let first = storage
            .store_stream(".jpg", &mut Cursor::new(b"one".to_vec()))
            .await
            .unwrap();
        let second = storage
            .store_stream(".jpg", &mut Cursor::new(b"two".to_vec()))
            .await
            .unwrap();

        assert_ne!(first.key, second.key);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_store_stream_without_directory_fails() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("missing"), 0o755);

        let result = storage
            .store_stream(".png", &mut Cursor::new(b"data".to_vec()))
            .await;
        assert!(matches!(result, Err(StorageError::Create { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        LocalStorage::new(&uploads, 0o700).ensure_dir().await.unwrap();

        let mode = std::fs::metadata(&uploads).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads"), 0o755);
        storage.ensure_dir().await.unwrap();
        storage.ensure_dir().await.unwrap();
        assert!(dir.path().join("uploads").is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_fails_when_path_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let storage = LocalStorage::new(&blocker, 0o755);
        let result = storage.ensure_dir().await;
        assert!(matches!(result, Err(StorageError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_failed_copy_removes_partial_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), 0o755);

        let result = storage
            .store_stream(".png", &mut FailingReader { sent: false })
            .await;

        assert!(matches!(result, Err(StorageError::Write { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), 0o755);

        let stored = storage
            .store_stream(".png", &mut Cursor::new(b"data".to_vec()))
            .await
            .unwrap();
        assert!(stored.path.exists());

        storage.delete(&stored.key).await.unwrap();
        assert!(!stored.path.exists());

        // Deleting again is a no-op.
        storage.delete(&stored.key).await.unwrap();
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), 0o755);

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
