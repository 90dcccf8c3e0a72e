pub mod auth;
pub mod blob;
pub mod error;
pub mod records;
pub mod testing;

pub use auth::{AuthBackend, SessionToken};
pub use blob::{BlobStore, ProgressFn};
pub use error::BackendError;
pub use records::RecordStore;
