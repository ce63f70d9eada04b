//! # Local Filesystem Backend

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use uuid::Uuid;

use super::backend::{BlobEntry, BlobStore};
use super::errors::{StoreError, StoreResult};

/// Local filesystem blob store rooted at a data directory
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StoreError::Validation(format!("path escapes store root: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBackend {
    async fn put_blob(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        let target = self.full_path(path)?;
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::Validation(format!("blob path has no file name: {}", path)))?
            .to_string();

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Stage the full content, then link it into place. The link fails if
        // the target exists, so readers never observe a partial blob and an
        // existing blob is never replaced.
        let staged = target.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
        fs::write(&staged, content).await?;
        let linked = fs::hard_link(&staged, &target).await;
        let _ = fs::remove_file(&staged).await;

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::KeyConflict(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_blobs(&self, prefix: &str) -> StoreResult<Vec<BlobEntry>> {
        let dir = self.full_path(prefix)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut results = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = match entry.file_name().to_str() {
                Some(name) if !name.starts_with('.') => name.to_string(),
                _ => continue,
            };
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let mut blob = BlobEntry::new(prefix, name);
            blob.size = Some(metadata.len());
            blob.modified = metadata.modified().ok().map(DateTime::<Utc>::from);
            results.push(blob);
        }

        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    async fn get_blob(&self, path: &str) -> StoreResult<Vec<u8>> {
        let full_path = self.full_path(path)?;

        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound(path.to_string())
            } else {
                e.into()
            }
        })
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let full_path = self.full_path(path)?;
        Ok(fs::try_exists(&full_path).await?)
    }
}
