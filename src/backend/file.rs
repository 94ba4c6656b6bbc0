//! File-system storage backend.
//!
//! Each key is one file in a base directory: `<base_dir>/<encoded key>.store`.
//! Writes go to `<key>.store.tmp` first and are renamed into place, so a
//! crash mid-write never leaves a half-written aggregate behind.

use super::StorageBackend;
use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FILE_EXTENSION: &str = "store";

/// Storage backend keeping one file per key under a directory.
///
/// # Example
///
/// ```no_run
/// use studio_ledger::backend::{FileBackend, StorageBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = FileBackend::new("/var/lib/studio");
///     backend.set("studioData", b"{}".to_vec()).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FileBackend {
    base_dir: Arc<PathBuf>,
}

impl FileBackend {
    /// Create a backend rooted at `base_dir`. The directory is created on
    /// first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileBackend {
            base_dir: Arc::new(base_dir.into()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding `key`.
    ///
    /// The key is percent-encoded, so separators never leave the base
    /// directory and distinct keys always map to distinct files.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", urlencoding::encode(key), FILE_EXTENSION))
    }
}

impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("✓ File GET {} -> HIT ({} bytes)", key, bytes.len());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("✓ File GET {} -> MISS", key);
                Ok(None)
            }
            Err(e) => Err(Error::BackendError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(self.base_dir.as_path())
            .await
            .map_err(|e| {
                Error::BackendError(format!(
                    "Failed to create {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        let size = value.len();

        tokio::fs::write(&tmp_path, value).await.map_err(|e| {
            Error::BackendError(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            Error::BackendError(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!("✓ File SET {} ({} bytes)", key, size);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::BackendError(format!(
                    "Failed to remove {}: {}",
                    path.display(),
                    e
                )))
            }
        }
        debug!("✓ File DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    async fn health_check(&self) -> Result<bool> {
        match tokio::fs::metadata(self.base_dir.as_path()).await {
            Ok(meta) => Ok(meta.is_dir()),
            // Not created yet; the first write will create it.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(self.base_dir.as_path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
                tokio::fs::remove_file(&path).await?;
            }
        }

        warn!(
            "⚠ File CLEAR_ALL executed - all stores under {} removed!",
            self.base_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_backend_set_get() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path());

        backend.set("studioData", b"{\"a\":1}".to_vec()).await.unwrap();

        let value = backend.get("studioData").await.unwrap();
        assert_eq!(value, Some(b"{\"a\":1}".to_vec()));
        assert!(backend.path_for("studioData").exists());
    }

    #[tokio::test]
    async fn test_file_backend_miss() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path().join("not-created-yet"));

        assert_eq!(backend.get("studioData").await.unwrap(), None);
        assert!(!backend.exists("studioData").await.unwrap());
        assert!(backend.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_backend_no_temp_file_left() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path());

        backend.set("studioData", b"{}".to_vec()).await.unwrap();

        let final_path = backend.path_for("studioData");
        let tmp_path = final_path.with_extension("store.tmp");
        assert!(final_path.exists());
        assert!(!tmp_path.exists());
    }

    #[tokio::test]
    async fn test_file_backend_delete() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path());

        backend.set("studioData", b"{}".to_vec()).await.unwrap();
        backend.delete("studioData").await.unwrap();
        assert!(!backend.exists("studioData").await.unwrap());

        // Deleting an absent key is fine
        backend.delete("studioData").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_backend_key_sanitized() {
        let backend = FileBackend::new("/data/studio");
        let path = backend.path_for("../../etc/passwd");
        assert_eq!(
            path,
            PathBuf::from("/data/studio/..%2F..%2Fetc%2Fpasswd.store")
        );
        assert_eq!(path.parent(), Some(Path::new("/data/studio")));
    }

    #[tokio::test]
    async fn test_file_backend_distinct_keys_distinct_files() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path());

        let slash = backend.path_for("a/b");
        let underscore = backend.path_for("a_b");
        assert_ne!(slash, underscore);
        assert_eq!(slash.parent(), Some(dir.path()));
        assert_eq!(underscore.parent(), Some(dir.path()));

        backend.set("a/b", b"slash".to_vec()).await.unwrap();
        backend.set("a_b", b"underscore".to_vec()).await.unwrap();
        assert_eq!(backend.get("a/b").await.unwrap(), Some(b"slash".to_vec()));
        assert_eq!(backend.get("a_b").await.unwrap(), Some(b"underscore".to_vec()));
    }

    #[tokio::test]
    async fn test_file_backend_clear_all() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let backend = FileBackend::new(dir.path());

        backend.set("a", b"1".to_vec()).await.unwrap();
        backend.set("b", b"2".to_vec()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        backend.clear_all().await.unwrap();

        assert!(!backend.exists("a").await.unwrap());
        assert!(!backend.exists("b").await.unwrap());
        assert!(dir.path().join("notes.txt").exists());
    }
}
