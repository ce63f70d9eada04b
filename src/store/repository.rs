//! # Document Repository
//!
//! Create, list and get-latest over any [`BlobStore`].
//!
//! Every backing store call runs under the configured timeout; an expired
//! call fails with `StorageUnavailable`. Nothing is retried here. A create
//! is one listing followed by one create-if-absent write, so two writers
//! racing for the same base can both compute the same next version. Both
//! shipped backends refuse to overwrite, so the loser gets `KeyConflict`
//! and no stored blob is ever lost; callers may re-list and retry.

use std::future::Future;

use futures_util::stream::{self, StreamExt};

use crate::observability::{log_event_with_fields, Event};

use super::backend::{join_path, BlobEntry, BlobStore};
use super::config::StoreConfig;
use super::document::{Document, DocumentSummary};
use super::errors::{StoreError, StoreResult};
use super::naming::{base_key, id_prefix, StorageKey};
use super::resolver::{
    filter_by_id, latest, newest_first, next_key, Candidate, LatestOrdering, TimeKey,
};

/// Versioned document repository
#[derive(Debug)]
pub struct DocumentRepository<B: BlobStore> {
    backend: B,
    config: StoreConfig,
}

impl<B: BlobStore> DocumentRepository<B> {
    /// Create a new repository
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn namespace(&self) -> &str {
        self.config.namespace.trim_end_matches('/')
    }

    /// Run one backing store call under the configured timeout
    async fn call<T, F>(&self, op: &'static str, target: &str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let outcome = match tokio::time::timeout(self.config.timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::StorageUnavailable(format!(
                "{} {} timed out after {}ms",
                op, target, self.config.timeout_ms
            ))),
        };

        if let Err(e) = &outcome {
            if e.is_unavailable() {
                log_event_with_fields(
                    Event::StoreUnavailable,
                    &[("op", op), ("target", target), ("reason", &e.to_string())],
                );
            }
        }
        outcome
    }

    async fn list_namespace(&self) -> StoreResult<Vec<BlobEntry>> {
        let ns = self.namespace();
        self.call("list", ns, self.backend.list_blobs(ns)).await
    }

    async fn fetch(&self, name: &str) -> StoreResult<Document> {
        let path = join_path(self.namespace(), name);
        let bytes = self.call("get", &path, self.backend.get_blob(&path)).await?;
        Document::from_stored(name, &bytes)
    }

    /// Store a new document and return the key it landed at
    ///
    /// Exactly one blob is created. Fails with `Validation` (and writes
    /// nothing) when `id` is missing.
    pub async fn create(&self, mut doc: Document) -> StoreResult<StorageKey> {
        doc.prepare_for_create()?;

        let base = base_key(
            doc.id.as_deref().unwrap_or_default(),
            doc.created_at.as_deref().unwrap_or_default(),
        )?;
        let body = doc.to_bytes()?;

        let existing = self.list_namespace().await?;
        let name = next_key(existing.iter().map(|e| e.name.as_str()), &base);
        let path = join_path(self.namespace(), &name);

        if let Err(e) = self.call("put", &path, self.backend.put_blob(&path, &body)).await {
            if let StoreError::KeyConflict(_) = e {
                log_event_with_fields(Event::KeyConflict, &[("key", &name)]);
            }
            return Err(e);
        }

        let key = StorageKey::parse(&name)?;
        log_event_with_fields(
            Event::DocumentCreated,
            &[("key", &name), ("version", &key.version.to_string())],
        );
        Ok(key)
    }

    /// Summaries of every stored document, newest `createdAt` first
    ///
    /// Blobs that are not storage keys, fail to parse, or disappear between
    /// listing and fetching are left out. Any other failure aborts.
    pub async fn list(&self) -> StoreResult<Vec<DocumentSummary>> {
        let entries = self.list_namespace().await?;

        let loaded: Vec<StoreResult<(StorageKey, Document)>> = stream::iter(entries)
            .map(|entry| async move {
                let key = StorageKey::parse(&entry.name)?;
                let doc = self.fetch(&entry.name).await?;
                Ok::<_, StoreError>((key, doc))
            })
            .buffer_unordered(self.config.concurrency())
            .collect()
            .await;

        let mut ordered = Vec::with_capacity(loaded.len());
        for result in loaded {
            match result {
                Ok((key, doc)) => {
                    let summary = DocumentSummary::from_document(&doc, &key);
                    ordered.push((TimeKey::from_created_at(&summary.created_at), summary));
                }
                Err(e @ StoreError::Parse { .. }) | Err(e @ StoreError::NotFound(_)) => {
                    log_event_with_fields(Event::DocumentSkipped, &[("reason", &e.to_string())]);
                }
                Err(e) => return Err(e),
            }
        }

        ordered.sort_by(|(ta, a), (tb, b)| {
            newest_first((ta, a.version, a.key.as_str()), (tb, b.version, b.key.as_str()))
        });
        Ok(ordered.into_iter().map(|(_, summary)| summary).collect())
    }

    /// The current version of the document with this id
    ///
    /// When ordering by name, a winner that fails to parse is an error. When
    /// ordering by content, unreadable candidates are skipped and `Parse` is
    /// returned only if none remain.
    pub async fn get_latest(&self, id: &str) -> StoreResult<Document> {
        let prefix = id_prefix(id)?;
        let entries = self.list_namespace().await?;

        let names = filter_by_id(
            entries
                .iter()
                .map(|e| e.name.as_str())
                .filter(|name| name.starts_with(&prefix)),
            id,
        );
        if names.is_empty() {
            log_event_with_fields(Event::DocumentNotFound, &[("id", id)]);
            return Err(StoreError::NotFound(id.to_string()));
        }

        match self.config.latest_ordering {
            LatestOrdering::Name => {
                let candidates: Vec<Candidate> =
                    names.iter().map(|name| Candidate::from_name(*name)).collect();
                let winner = latest(&candidates, id)
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                self.fetch(&winner.name).await
            }
            LatestOrdering::Content => {
                let fetched: Vec<(String, StoreResult<Document>)> =
                    stream::iter(names.into_iter().map(str::to_owned))
                        .map(|name: String| async move {
                            let doc = self.fetch(&name).await;
                            (name, doc)
                        })
                        .buffer_unordered(self.config.concurrency())
                        .collect()
                        .await;

                let mut loaded = Vec::with_capacity(fetched.len());
                let mut first_skipped = None;
                for (name, result) in fetched {
                    match result {
                        Ok(doc) => loaded.push((name, doc)),
                        Err(e @ StoreError::Parse { .. }) | Err(e @ StoreError::NotFound(_)) => {
                            log_event_with_fields(
                                Event::DocumentSkipped,
                                &[("reason", &e.to_string())],
                            );
                            if first_skipped.is_none() {
                                first_skipped = Some(e);
                            }
                        }
                        Err(e) => return Err(e),
                    }
                }
                if loaded.is_empty() {
                    return Err(first_skipped
                        .unwrap_or_else(|| StoreError::NotFound(id.to_string())));
                }

                let candidates: Vec<Candidate> = loaded
                    .iter()
                    .map(|(name, doc)| {
                        Candidate::with_created_at(
                            name.as_str(),
                            doc.created_at.clone().unwrap_or_default(),
                        )
                    })
                    .collect();
                let winner = latest(&candidates, id)
                    .map(|c| c.name.clone())
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

                let index = loaded
                    .iter()
                    .position(|(name, _)| *name == winner)
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                Ok(loaded.swap_remove(index).1)
            }
        }
    }
}
