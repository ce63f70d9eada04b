//! # Versioned Document Store
//!
//! Persists proforma documents as immutable JSON blobs in a backend-agnostic
//! blob store. A document is never overwritten: storing another document
//! with the same id and timestamp creates the next version.
//!
//! - [`naming`] derives storage keys from `id` and `createdAt`
//! - [`resolver`] picks the next free version and the current version
//! - [`repository`] orchestrates both against a [`BlobStore`]

pub mod errors;
pub mod backend;
pub mod local;
pub mod memory;
pub mod config;
pub mod document;
pub mod naming;
pub mod resolver;
pub mod repository;

pub use errors::{StoreError, StoreResult};
pub use backend::{BlobEntry, BlobStore};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use config::StoreConfig;
pub use document::{Document, DocumentSummary};
pub use naming::{base_key, StorageKey};
pub use resolver::{latest, next_key, probe_next_key, Candidate, LatestOrdering};
pub use repository::DocumentRepository;
