use std::sync::Arc;

use bytes::Bytes;

use depot_backend::blob::BlobStore;
use depot_backend::error::BackendError;
use depot_backend::records::RecordStore;
use depot_backend_memory::{MemoryBlobStore, MemoryRecordStore};
use depot_core::key::ShareKey;
use depot_core::types::OwnerId;
use depot_registry::{FileRegistry, RegistryError};

fn registry() -> (FileRegistry, Arc<MemoryBlobStore>, Arc<MemoryRecordStore>) {
    let blob = Arc::new(MemoryBlobStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let registry = FileRegistry::new(
        Arc::clone(&blob) as Arc<dyn BlobStore>,
        Arc::clone(&records) as Arc<dyn RecordStore>,
    );
    (registry, blob, records)
}

#[tokio::test]
async fn upload_makes_record_resolvable_with_zero_downloads() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();

    let record = registry
        .upload(
            owner,
            "report.pdf",
            "application/pdf",
            Bytes::from(vec![0u8; 2048]),
            None,
        )
        .await
        .unwrap();

    let resolved = registry.resolve(&record.unique_key).await.unwrap();
    assert_eq!(resolved.id, record.id);
    assert_eq!(resolved.downloads, 0);
    assert_eq!(resolved.size, 2048);
    assert_eq!(resolved.content_type, "application/pdf");
}

#[tokio::test]
async fn list_is_owner_scoped_and_newest_first() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();
    let stranger = OwnerId::new();

    for name in ["a.txt", "b.txt", "c.txt"] {
        registry
            .upload(owner, name, "text/plain", Bytes::from_static(b"x"), None)
            .await
            .unwrap();
    }
    registry
        .upload(stranger, "other.txt", "text/plain", Bytes::from_static(b"y"), None)
        .await
        .unwrap();

    let listed = registry.list(&owner).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(listed.iter().all(|r| r.owner == owner));
}

#[tokio::test]
async fn resolve_of_unissued_key_is_not_found() {
    let (registry, _, _) = registry();
    let err = registry.resolve(&ShareKey::generate()).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

#[tokio::test]
async fn download_streams_bytes_and_increments_counter() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();
    let payload = Bytes::from_static(b"the payload bytes");

    let record = registry
        .upload(owner, "notes.txt", "text/plain", payload.clone(), None)
        .await
        .unwrap();

    let (first, data) = registry.download(&record.unique_key).await.unwrap();
    assert_eq!(data, payload);
    assert_eq!(first.downloads, 1);

    let (second, _) = registry.download(&record.unique_key).await.unwrap();
    assert_eq!(second.downloads, 2);

    // The listing reflects the increments.
    let listed = registry.list(&owner).await.unwrap();
    assert_eq!(listed[0].downloads, 2);
}

#[tokio::test]
async fn concurrent_downloads_increment_exactly_n_times() {
    let (registry, _, _) = registry();
    let registry = Arc::new(registry);
    let owner = OwnerId::new();

    let record = registry
        .upload(owner, "hot.bin", "application/octet-stream", Bytes::from_static(b"z"), None)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let registry = Arc::clone(&registry);
        let key = record.unique_key.clone();
        handles.push(tokio::spawn(async move {
            registry.download(&key).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let resolved = registry.resolve(&record.unique_key).await.unwrap();
    assert_eq!(resolved.downloads, 20);
}

#[tokio::test]
async fn delete_removes_record_and_blob_and_is_idempotent() {
    let (registry, blob, _) = registry();
    let owner = OwnerId::new();

    let record = registry
        .upload(owner, "gone.txt", "text/plain", Bytes::from_static(b"bye"), None)
        .await
        .unwrap();

    registry.delete(&owner, &record.id, &record.path).await.unwrap();

    let err = registry.resolve(&record.unique_key).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert!(blob.get(&record.path).await.unwrap().is_none());

    // Second delete: blob already absent is success, record already gone
    // is success.
    registry.delete(&owner, &record.id, &record.path).await.unwrap();
}

#[tokio::test]
async fn delete_by_non_owner_is_denied_and_keeps_the_file() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();
    let stranger = OwnerId::new();

    let record = registry
        .upload(owner, "mine.txt", "text/plain", Bytes::from_static(b"mine"), None)
        .await
        .unwrap();

    let err = registry
        .delete(&stranger, &record.id, &record.path)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Backend(BackendError::Denied(_))));

    // The ownership check lives on the record side, so the metadata
    // survives a denied delete. Callers above the registry resolve the
    // (id, path) pair from the owner's own records before invoking delete.
    assert!(registry.resolve(&record.unique_key).await.is_ok());
}

#[tokio::test]
async fn download_after_delete_is_not_found() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();

    let record = registry
        .upload(owner, "x.txt", "text/plain", Bytes::from_static(b"x"), None)
        .await
        .unwrap();
    registry.delete(&owner, &record.id, &record.path).await.unwrap();

    let err = registry.download(&record.unique_key).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}

#[tokio::test]
async fn upload_reports_monotonic_progress() {
    let (registry, _, _) = registry();
    let owner = OwnerId::new();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_in_cb = Arc::clone(&seen);
    let observer: depot_registry::ProgressObserver = Arc::new(move |transferred, total| {
        seen_in_cb.lock().unwrap().push((transferred, total));
    });

    registry
        .upload(
            owner,
            "tracked.bin",
            "application/octet-stream",
            Bytes::from(vec![7u8; 4096]),
            Some(observer),
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0), "progress must not regress");
    assert_eq!(seen.last().unwrap(), &(4096, 4096));
}
