//! Cache collaborator contract for compiled tries.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{archive::ArchiveError, trie::RouteTrie};

/// Cache failures. A corrupt payload is deliberately a hard error: it
/// surfaces deployment bugs instead of masking them behind a silent
/// recompile.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// I/O against the cache medium failed.
    #[error("trie cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored payload is not a readable archive at all.
    #[error("corrupt trie cache payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload decoded but its records are invalid.
    #[error("corrupt trie cache payload: {0}")]
    Archive(#[from] ArchiveError),
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// TrieCache defines the port (interface) for persisting compiled tries
/// between processes. The storage medium is out of scope; implementations
/// only ever run during compilation, never on the match hot path.
///
/// Concurrent cold-start writers are tolerated: compilation is idempotent
/// and the last `set` wins.
#[async_trait]
pub trait TrieCache: Send + Sync {
    /// Load the cached trie, or `None` when the cache is cold.
    async fn get(&self) -> CacheResult<Option<RouteTrie>>;

    /// Store a freshly compiled trie.
    async fn set(&self, trie: &RouteTrie) -> CacheResult<()>;

    /// Whether a cached trie is present.
    async fn has(&self) -> CacheResult<bool>;

    /// Drop the cached trie, forcing the next build to compile fresh.
    async fn flush(&self) -> CacheResult<()>;
}
