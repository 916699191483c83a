//! File-backed trie cache speaking the versioned flat archive format.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    core::{archive::TrieArchive, rules::RuleFactory, trie::RouteTrie},
    ports::{CacheError, CacheResult, TrieCache},
};

/// Persists the compiled trie as a JSON [`TrieArchive`] on disk. Decoding
/// validates the archive version and every record, and re-resolves rule
/// applications through the carried [`RuleFactory`]; anything inconsistent
/// is a hard [`CacheError`].
///
/// Writes are last-writer-wins, which is exactly what concurrent
/// cold-start compilation needs.
pub struct FileTrieCache {
    path: PathBuf,
    rule_factory: RuleFactory,
}

impl FileTrieCache {
    pub fn new(path: impl Into<PathBuf>, rule_factory: RuleFactory) -> Self {
        Self {
            path: path.into(),
            rule_factory,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TrieCache for FileTrieCache {
    async fn get(&self) -> CacheResult<Option<RouteTrie>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(CacheError::Io(error)),
        };

        let archive: TrieArchive = serde_json::from_slice(&bytes)?;
        let trie = archive.into_trie(&self.rule_factory)?;
        debug!(path = %self.path.display(), nodes = trie.node_count(), "read trie cache file");
        Ok(Some(trie))
    }

    async fn set(&self, trie: &RouteTrie) -> CacheResult<()> {
        let archive = TrieArchive::from_trie(trie);
        let bytes = serde_json::to_vec(&archive)?;
        tokio::fs::write(&self.path, &bytes).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "wrote trie cache file");
        Ok(())
    }

    async fn has(&self) -> CacheResult<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn flush(&self) -> CacheResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(CacheError::Io(error)),
        }
    }
}
