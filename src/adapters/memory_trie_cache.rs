//! Process-local trie cache, mainly for tests and embedding.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::{
    core::trie::RouteTrie,
    ports::{CacheResult, TrieCache},
};

/// Keeps the compiled trie in memory. Useful when several router
/// instances in one process should share a single compilation, and as the
/// cache double in tests.
#[derive(Debug, Default)]
pub struct MemoryTrieCache {
    slot: RwLock<Option<RouteTrie>>,
}

impl MemoryTrieCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrieCache for MemoryTrieCache {
    async fn get(&self) -> CacheResult<Option<RouteTrie>> {
        Ok(self
            .slot
            .read()
            .expect("failed to lock trie cache slot")
            .clone())
    }

    async fn set(&self, trie: &RouteTrie) -> CacheResult<()> {
        *self.slot.write().expect("failed to lock trie cache slot") = Some(trie.clone());
        Ok(())
    }

    async fn has(&self) -> CacheResult<bool> {
        Ok(self
            .slot
            .read()
            .expect("failed to lock trie cache slot")
            .is_some())
    }

    async fn flush(&self) -> CacheResult<()> {
        *self.slot.write().expect("failed to lock trie cache slot") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cold_cache_is_empty() {
        let cache = MemoryTrieCache::new();
        assert!(!cache.has().await.expect("has"));
        assert!(cache.get().await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_set_get_flush_cycle() {
        let cache = MemoryTrieCache::new();
        let trie = RouteTrie::new();

        cache.set(&trie).await.expect("set");
        assert!(cache.has().await.expect("has"));
        assert_eq!(cache.get().await.expect("get"), Some(trie));

        cache.flush().await.expect("flush");
        assert!(!cache.has().await.expect("has"));
    }
}
