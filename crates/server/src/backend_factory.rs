use std::sync::Arc;

use tracing::info;

use depot_backend::auth::AuthBackend;
use depot_backend::blob::BlobStore;
use depot_backend::records::RecordStore;
use depot_backend_memory::{MemoryAuthBackend, MemoryBlobStore, MemoryRecordStore};
use depot_backend_remote::RemoteBackend;

use crate::config::{BackendConfig, BackendKind};

/// The three backend capability handles the server wires together.
pub type BackendHandles = (
    Arc<dyn AuthBackend>,
    Arc<dyn BlobStore>,
    Arc<dyn RecordStore>,
);

/// Construct the backend selected by configuration.
///
/// The remote backend is constructed even when its connection values are
/// missing; calls against it fail at call time, which keeps startup
/// available in degraded mode.
#[must_use]
pub fn create_backend(config: &BackendConfig) -> BackendHandles {
    match config.kind {
        BackendKind::Memory => {
            info!("using in-memory backend");
            (
                Arc::new(MemoryAuthBackend::new()),
                Arc::new(MemoryBlobStore::new()),
                Arc::new(MemoryRecordStore::new()),
            )
        }
        BackendKind::Remote => {
            let backend = Arc::new(RemoteBackend::new(
                config.url.clone().unwrap_or_default(),
                config.anon_key.clone().unwrap_or_default(),
            ));
            info!(
                configured = backend.is_configured(),
                "using remote backend"
            );
            (
                Arc::clone(&backend) as Arc<dyn AuthBackend>,
                Arc::clone(&backend) as Arc<dyn BlobStore>,
                backend as Arc<dyn RecordStore>,
            )
        }
    }
}
