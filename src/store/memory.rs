//! # In-Memory Backend
//!
//! Keeps blobs in a sorted map. Used by tests and for ephemeral runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::backend::{BlobEntry, BlobStore};
use super::errors::{StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::StorageUnavailable("Lock poisoned".into())
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn put_blob(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| poisoned())?;

        if blobs.contains_key(path) {
            return Err(StoreError::KeyConflict(path.to_string()));
        }
        blobs.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn list_blobs(&self, prefix: &str) -> StoreResult<Vec<BlobEntry>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;

        let dir = prefix.trim_end_matches('/');
        let now = Utc::now();
        let results = blobs
            .iter()
            .filter_map(|(path, data)| {
                let name = if dir.is_empty() {
                    path.as_str()
                } else {
                    path.strip_prefix(dir)?.strip_prefix('/')?
                };
                if name.is_empty() || name.contains('/') {
                    return None;
                }
                let mut entry = BlobEntry::new(dir, name);
                entry.size = Some(data.len() as u64);
                entry.modified = Some(now);
                Some(entry)
            })
            .collect();

        Ok(results)
    }

    async fn get_blob(&self, path: &str) -> StoreResult<Vec<u8>> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;

        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> StoreResult<bool> {
        let blobs = self.blobs.read().map_err(|_| poisoned())?;
        Ok(blobs.contains_key(path))
    }
}
