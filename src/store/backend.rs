//! # Blob Store Backend Trait

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StoreResult;

/// A blob as seen by a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    /// File name within the listed directory
    pub name: String,
    /// Full path, usable with `get_blob`
    pub path: String,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

impl BlobEntry {
    pub fn new(dir: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: join_path(dir, &name),
            name,
            size: None,
            modified: None,
        }
    }
}

/// Join a directory prefix and a blob name with a single `/`
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Primitives any backing store must provide
///
/// `put_blob` must never overwrite: writing to a path that already holds a
/// blob fails with `StoreError::KeyConflict` and leaves the existing blob
/// intact.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Create a blob at `path`
    async fn put_blob(&self, path: &str, content: &[u8]) -> StoreResult<()>;

    /// List blobs directly under `prefix` (empty when the prefix does not exist)
    async fn list_blobs(&self, prefix: &str) -> StoreResult<Vec<BlobEntry>>;

    /// Read the blob at `path`
    async fn get_blob(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Check if a blob exists at `path`
    async fn exists(&self, path: &str) -> StoreResult<bool>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put_blob(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        (**self).put_blob(path, content).await
    }

    async fn list_blobs(&self, prefix: &str) -> StoreResult<Vec<BlobEntry>> {
        (**self).list_blobs(prefix).await
    }

    async fn get_blob(&self, path: &str) -> StoreResult<Vec<u8>> {
        (**self).get_blob(path).await
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        (**self).exists(path).await
    }
}
