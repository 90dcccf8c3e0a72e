pub mod error;
pub mod file;
pub mod key;
pub mod routes;
pub mod session;
pub mod types;

pub use error::DomainError;
pub use file::FileRecord;
pub use key::{SHARE_KEY_LEN, ShareKey, StoragePath};
pub use routes::{GateDecision, RoutePolicy};
pub use session::{Identity, SessionEvent, SessionState, reduce};
pub use types::{FileId, OwnerId};
