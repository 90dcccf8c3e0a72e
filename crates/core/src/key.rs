use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::OwnerId;

/// Length of a generated share key.
pub const SHARE_KEY_LEN: usize = 10;

/// URL-safe alphabet used for share keys (64 symbols).
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Short URL-safe token identifying a file record.
///
/// The key is the sole credential required to download the file: anyone
/// holding it may resolve the record and fetch the blob. Keys are immutable
/// once assigned. With 64 symbols over 10 positions the key space is 64^10
/// (~1.15e18), which makes accidental collisions negligible; the record
/// store still enforces uniqueness on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareKey(String);

impl ShareKey {
    /// Generate a fresh random share key.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let key: String = (0..SHARE_KEY_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(key)
    }

    /// Parse and validate a key received from the outside (e.g. a URL path
    /// segment). Rejects anything that is not exactly [`SHARE_KEY_LEN`]
    /// characters from the key alphabet.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.len() != SHARE_KEY_LEN || !s.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(DomainError::InvalidShareKey(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShareKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique string key under which a file's raw bytes live in the object
/// store. Distinct from the share key: the path addresses the blob, the
/// share key addresses the metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    /// Compose the storage path for an upload: `{owner}/{key}-{name}`.
    ///
    /// The file name is sanitized so the path stays a flat two-segment
    /// object key regardless of what the uploader called the file.
    pub fn compose(owner: &OwnerId, key: &ShareKey, name: &str) -> Result<Self, DomainError> {
        let name = sanitize_file_name(name);
        if name.is_empty() {
            return Err(DomainError::InvalidFileName(name));
        }
        Ok(Self(format!("{owner}/{key}-{name}")))
    }

    /// Wrap an already-composed path (e.g. read back from the record store).
    #[must_use]
    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace path separators and control characters with `_`, and trim
/// surrounding whitespace.
fn sanitize_file_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}
