//! Index cache location derivation.
//!
//! Maps a document identity string to a stable directory under the
//! cache root: the key is the first 128 bits of SHA-256 over the
//! identity, hex-encoded, so the same identity always lands on the same
//! directory. Deriving a location also creates the cache root if it is
//! absent (idempotent). The key carries no content or parameter hash,
//! so a changed document behind an unchanged path reuses the old index
//! until `cache clear` or a forced rebuild.

use std::io;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::config::CacheConfig;

/// Digest bytes kept in the key (128 bits, 32 hex chars).
const KEY_BYTES: usize = 16;

/// Deterministic cache key for a document identity.
pub fn index_key(identity: &str) -> String {
    let digest = Sha256::digest(identity.as_bytes());
    hex::encode(&digest[..KEY_BYTES])
}

/// Directory holding the persisted index for `identity`. Ensures the
/// cache root exists; the per-key directory itself is created when the
/// index is persisted.
pub fn index_dir(cache: &CacheConfig, identity: &str) -> io::Result<PathBuf> {
    std::fs::create_dir_all(&cache.dir)?;
    Ok(cache.dir.join(format!("index-{}", index_key(identity))))
}
