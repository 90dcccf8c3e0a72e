//! Conformance test suites for backend implementations.
//!
//! Call these from a backend's test module with a fresh instance; every
//! implementation must pass them unchanged.

use bytes::Bytes;

use depot_core::file::FileRecord;
use depot_core::key::{ShareKey, StoragePath};
use depot_core::types::{FileId, OwnerId};

use crate::auth::AuthBackend;
use crate::blob::BlobStore;
use crate::error::BackendError;
use crate::records::RecordStore;

fn sample_record(owner: OwnerId, name: &str) -> FileRecord {
    let key = ShareKey::generate();
    let path = StoragePath::compose(&owner, &key, name).expect("valid name");
    FileRecord::new(owner, name, 1024, "application/octet-stream", key, path)
}

/// Run the record-store conformance suite.
///
/// # Errors
///
/// Returns an error if any conformance check fails.
pub async fn run_record_store_conformance(store: &dyn RecordStore) -> Result<(), BackendError> {
    let owner = OwnerId::new();

    // find_by_key on a never-issued key is None, not an error.
    let missing = store.find_by_key(&ShareKey::generate()).await?;
    assert!(missing.is_none(), "unknown key must resolve to None");

    // insert then find_by_key returns the record with downloads = 0.
    let record = sample_record(owner, "a.bin");
    store.insert(&record).await?;
    let found = store
        .find_by_key(&record.unique_key)
        .await?
        .expect("inserted record must be resolvable");
    assert_eq!(found.id, record.id);
    assert_eq!(found.downloads, 0);

    // Duplicate share key is a conflict.
    let mut dup = sample_record(owner, "b.bin");
    dup.unique_key = record.unique_key.clone();
    let err = store.insert(&dup).await.expect_err("duplicate key must conflict");
    assert!(matches!(err, BackendError::Conflict(_)));

    // list_by_owner is newest-first and owner-scoped.
    let second = sample_record(owner, "c.bin");
    store.insert(&second).await?;
    store.insert(&sample_record(OwnerId::new(), "other.bin")).await?;
    let listed = store.list_by_owner(&owner).await?;
    assert_eq!(listed.len(), 2);
    assert!(
        listed[0].created_at >= listed[1].created_at,
        "listing must be created_at descending"
    );
    assert!(listed.iter().all(|r| r.owner == owner));

    // increment_downloads is exact and returns the new value.
    assert_eq!(store.increment_downloads(&record.id).await?, 1);
    assert_eq!(store.increment_downloads(&record.id).await?, 2);
    let err = store
        .increment_downloads(&FileId::new())
        .await
        .expect_err("unknown record must not increment");
    assert!(matches!(err, BackendError::NotFound(_)));

    // delete enforces ownership and reports prior existence.
    let err = store
        .delete(&record.id, &OwnerId::new())
        .await
        .expect_err("foreign delete must be denied");
    assert!(matches!(err, BackendError::Denied(_)));
    assert!(store.delete(&record.id, &owner).await?);
    assert!(!store.delete(&record.id, &owner).await?);
    assert!(store.find_by_key(&record.unique_key).await?.is_none());

    Ok(())
}

/// Run the blob-store conformance suite.
///
/// # Errors
///
/// Returns an error if any conformance check fails.
pub async fn run_blob_store_conformance(store: &dyn BlobStore) -> Result<(), BackendError> {
    let owner = OwnerId::new();
    let key = ShareKey::generate();
    let path = StoragePath::compose(&owner, &key, "payload.bin").expect("valid name");

    // get on an absent path is None.
    assert!(store.get(&path).await?.is_none());

    // put then get round-trips the bytes.
    let data = Bytes::from_static(b"depot blob conformance payload");
    store.put(&path, "application/octet-stream", data.clone(), None).await?;
    let fetched = store.get(&path).await?.expect("stored blob must be readable");
    assert_eq!(fetched, data);

    // Overwriting an existing path is a conflict.
    let err = store
        .put(&path, "application/octet-stream", data.clone(), None)
        .await
        .expect_err("existing path must not be overwritten");
    assert!(matches!(err, BackendError::Conflict(_)));

    // delete reports prior existence and is idempotent.
    assert!(store.delete(&path).await?);
    assert!(!store.delete(&path).await?, "second delete must be Ok(false)");
    assert!(store.get(&path).await?.is_none());

    Ok(())
}

/// Run the auth-backend conformance suite.
///
/// # Errors
///
/// Returns an error if any conformance check fails.
pub async fn run_auth_backend_conformance(auth: &dyn AuthBackend) -> Result<(), BackendError> {
    let email = format!("{}@example.com", OwnerId::new());

    let identity = auth.sign_up(&email, "correct horse").await?;
    assert_eq!(identity.email, email);

    // Duplicate registration conflicts.
    let err = auth
        .sign_up(&email, "other password")
        .await
        .expect_err("duplicate email must conflict");
    assert!(matches!(err, BackendError::Conflict(_)));

    // Wrong password is rejected without detail.
    let err = auth
        .sign_in(&email, "wrong")
        .await
        .expect_err("wrong password must be rejected");
    assert!(matches!(err, BackendError::InvalidCredentials));

    // Sign-in issues a token that resolves to the identity.
    let (token, signed_in) = auth.sign_in(&email, "correct horse").await?;
    assert_eq!(signed_in, identity);
    let resolved = auth.session(&token).await?.expect("live token must resolve");
    assert_eq!(resolved, identity);

    // Sign-out revokes the token; repeated sign-out is harmless.
    auth.sign_out(&token).await?;
    assert!(auth.session(&token).await?.is_none());
    auth.sign_out(&token).await?;

    Ok(())
}
