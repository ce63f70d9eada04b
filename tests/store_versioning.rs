//! Document Store Versioning Tests
//!
//! End-to-end checks of create / list / get-latest against the filesystem
//! backend:
//! - create followed by get-latest round-trips the id
//! - sequential creates on one base get versions 1..N, pairwise distinct
//! - get-latest returns the highest version
//! - list survives malformed blobs and orders newest first
//! - invalid input writes nothing

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use proforma::store::{
    BlobStore, Document, DocumentRepository, LatestOrdering, LocalBackend, MemoryBackend,
    StorageKey, StoreConfig, StoreError,
};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn local_repo() -> (DocumentRepository<LocalBackend>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = DocumentRepository::new(LocalBackend::new(temp_dir.path()), StoreConfig::default());
    (repo, temp_dir)
}

fn proforma(id: &str, created_at: &str, total: i64) -> Document {
    Document::new(id, created_at)
        .with_field("clientName", "Acme")
        .with_field("total", total)
}

// =============================================================================
// Create / Get Latest
// =============================================================================

#[tokio::test]
async fn test_create_then_get_latest_returns_same_id() {
    let (repo, _temp) = local_repo();

    for id in ["INV-1", "2024/0042", "Q-7"] {
        repo.create(proforma(id, "2024-03-01T08:30:00Z", 1)).await.unwrap();
        let doc = repo.get_latest(id).await.unwrap();
        assert_eq!(doc.id.as_deref(), Some(id));
    }
}

#[tokio::test]
async fn test_sequential_creates_get_versions_one_to_n() {
    let (repo, _temp) = local_repo();
    const N: u32 = 6;

    let mut keys = Vec::new();
    for i in 0..N {
        let key = repo
            .create(proforma("INV-1", "2024-01-01T10:00:00Z", i as i64))
            .await
            .unwrap();
        keys.push(key);
    }

    let names: HashSet<String> = keys.iter().map(StorageKey::file_name).collect();
    assert_eq!(names.len(), N as usize, "storage keys must be pairwise distinct");

    let versions: HashSet<u32> = keys.iter().map(|k| k.version).collect();
    assert_eq!(versions, (1..=N).collect::<HashSet<_>>());

    let latest = repo.get_latest("INV-1").await.unwrap();
    assert_eq!(latest.field("total"), Some(&json!(N as i64 - 1)));
}

#[tokio::test]
async fn test_concrete_invoice_scenario() {
    let (repo, temp) = local_repo();

    let first = repo
        .create(proforma("INV-1", "2024-01-01T10:00:00Z", 50))
        .await
        .unwrap();
    let second = repo
        .create(proforma("INV-1", "2024-01-01T10:00:00Z", 60))
        .await
        .unwrap();

    assert_eq!(first.file_name(), "INV-1--20240101T100000Z.json");
    assert_eq!(second.file_name(), "INV-1--20240101T100000Z-v2.json");

    let latest = repo.get_latest("INV-1").await.unwrap();
    assert_eq!(latest.field("total"), Some(&json!(60)));

    // Version 1 is untouched on disk.
    let stored = fs::read(temp.path().join("data/proformas/INV-1--20240101T100000Z.json")).unwrap();
    let original: serde_json::Value = serde_json::from_slice(&stored).unwrap();
    assert_eq!(original["total"], 50);
}

#[tokio::test]
async fn test_get_latest_unknown_id_is_not_found() {
    let (repo, _temp) = local_repo();
    repo.create(proforma("INV-1", "2024-01-01T10:00:00Z", 1)).await.unwrap();

    let err = repo.get_latest("NO-SUCH-ID").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_latest_on_empty_store_is_not_found() {
    let (repo, _temp) = local_repo();
    let err = repo.get_latest("INV-1").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_create_empty_document_writes_nothing() {
    let (repo, temp) = local_repo();

    let err = repo.create(Document::from_value(json!({})).unwrap()).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(!temp.path().join("data").exists());
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_orders_by_created_at_descending() {
    let (repo, _temp) = local_repo();
    repo.create(proforma("JAN", "2024-01-01T00:00:00Z", 1)).await.unwrap();
    repo.create(proforma("JUN", "2024-06-01T00:00:00Z", 2)).await.unwrap();

    let summaries = repo.list().await.unwrap();
    let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["JUN", "JAN"]);
    assert_eq!(summaries[0].name, "Acme");
    assert_eq!(summaries[0].total, 2.0);
}

#[tokio::test]
async fn test_list_orders_iso_variants_by_instant() {
    let (repo, _temp) = local_repo();
    repo.create(proforma("OLD", "2024-01-01T00:00:00Z", 1)).await.unwrap();
    repo.create(proforma("NEW", "2025-01-01", 2)).await.unwrap();
    repo.create(proforma("NEWER", "2025-06-01T12:00:00", 3)).await.unwrap();

    let summaries = repo.list().await.unwrap();
    let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["NEWER", "NEW", "OLD"]);
}

#[tokio::test]
async fn test_content_ordering_survives_corrupt_older_version() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig {
        latest_ordering: LatestOrdering::Content,
        ..Default::default()
    };
    let repo = DocumentRepository::new(LocalBackend::new(temp_dir.path()), config);

    repo.create(proforma("A", "2024-06-01T10:00:00+02:00", 1)).await.unwrap();
    repo.create(proforma("A", "2024-06-01T09:00:00Z", 2)).await.unwrap();
    fs::write(
        temp_dir.path().join("data/proformas/A--20200101T000000Z.json"),
        b"{\"id\": ",
    )
    .unwrap();

    let latest = repo.get_latest("A").await.unwrap();
    assert_eq!(latest.field("total"), Some(&json!(2)));
}

#[tokio::test]
async fn test_list_excludes_malformed_blobs() {
    let (repo, temp) = local_repo();
    repo.create(proforma("GOOD", "2024-01-01T00:00:00Z", 1)).await.unwrap();

    let ns = temp.path().join("data/proformas");
    fs::write(ns.join("BROKEN--20240102T000000Z.json"), b"{\"id\": ").unwrap();
    fs::write(ns.join("NOID--20240103T000000Z.json"), b"{\"total\": 3}").unwrap();
    fs::write(ns.join("notes.txt"), b"not a document").unwrap();

    let summaries = repo.list().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "GOOD");
}

#[tokio::test]
async fn test_list_on_missing_namespace_is_empty() {
    let (repo, _temp) = local_repo();
    assert!(repo.list().await.unwrap().is_empty());
}

// =============================================================================
// Backends
// =============================================================================

#[tokio::test]
async fn test_shared_backend_behaves_like_concrete() {
    let backend: Arc<dyn BlobStore> = Arc::new(MemoryBackend::new());
    let repo = DocumentRepository::new(backend, StoreConfig::with_namespace("ledger"));

    repo.create(proforma("A", "2024", 1)).await.unwrap();
    repo.create(proforma("A", "2024", 2)).await.unwrap();

    assert!(repo.backend().exists("ledger/A--2024-v2.json").await.unwrap());
    assert_eq!(repo.get_latest("A").await.unwrap().field("total"), Some(&json!(2)));
}

#[tokio::test]
async fn test_concurrent_creates_never_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let repo = Arc::new(DocumentRepository::new(
        LocalBackend::new(temp_dir.path()),
        StoreConfig::default(),
    ));

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.create(proforma("RACE", "2024-01-01T00:00:00Z", i)).await
        }));
    }

    let mut written = HashSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(key) => assert!(written.insert(key.file_name())),
            Err(StoreError::KeyConflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    // Every successful write kept its own blob.
    let on_disk = fs::read_dir(temp_dir.path().join("data/proformas"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .count();
    assert_eq!(on_disk, written.len());
    assert!(!written.is_empty());
}
