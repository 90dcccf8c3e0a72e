mod auth;
mod blob;
mod records;

pub use auth::MemoryAuthBackend;
pub use blob::MemoryBlobStore;
pub use records::MemoryRecordStore;
