//! Filesystem-based artifact storage.

use async_trait::async_trait;
use folio_error::{FolioResult, StorageError, StorageErrorKind};
use folio_interface::StorageSink;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Filesystem storage backend.
///
/// Stores artifacts under `{base_path}/{folder}/{filename}` and returns
/// `{folder}/{filename}` as the locator. Writes go through a temp file and
/// rename for atomicity; an existing file with identical content is left
/// untouched.
pub struct FileSystemSink {
    base_path: PathBuf,
}

impl FileSystemSink {
    /// Create a new filesystem sink.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> FolioResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem sink");
        Ok(Self { base_path })
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Resolve a locator to an absolute path, rejecting traversal segments.
    fn resolve(&self, locator: &str) -> FolioResult<PathBuf> {
        let relative = Path::new(locator);
        let traversal = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative.is_absolute() || traversal {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                locator.to_string(),
            ))
            .into());
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageSink for FileSystemSink {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len(), folder = %folder, filename = %filename))]
    async fn save(&self, bytes: &[u8], folder: &str, filename: &str) -> FolioResult<String> {
        let locator = format!("{}/{}", folder, filename);
        let path = self.resolve(&locator)?;
        let hash = Self::compute_hash(bytes);

        // Identical content already stored: nothing to do
        if let Ok(existing) = tokio::fs::read(&path).await {
            if Self::compute_hash(&existing) == hash {
                tracing::debug!(
                    hash = %hash,
                    path = %path.display(),
                    "Artifact already stored, returning existing locator"
                );
                return Ok(locator);
            }
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = bytes.len(),
            "Stored artifact"
        );

        Ok(locator)
    }

    #[tracing::instrument(skip(self), fields(locator = %locator))]
    async fn get(&self, locator: &str) -> FolioResult<Vec<u8>> {
        let path = self.resolve(locator)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(locator.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            "Retrieved artifact"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("folio-sink-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let sink = FileSystemSink::new(temp_dir("roundtrip")).unwrap();
        let locator = sink.save(b"%PDF-1.5 fake", "pdfs", "report.pdf").await.unwrap();
        assert_eq!(locator, "pdfs/report.pdf");

        let bytes = sink.get(&locator).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.5 fake");
    }

    #[tokio::test]
    async fn test_get_missing_locator_is_not_found() {
        let sink = FileSystemSink::new(temp_dir("missing")).unwrap();
        assert!(sink.get("pdfs/nothing.pdf").await.is_err());
    }

    #[tokio::test]
    async fn test_traversal_locator_rejected() {
        let sink = FileSystemSink::new(temp_dir("traversal")).unwrap();
        assert!(sink.save(b"x", "..", "escape.pdf").await.is_err());
    }
}
