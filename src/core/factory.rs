//! Trie acquisition: cache first, compile on miss, populate the cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::{
    compiler::{CompileError, TrieCompiler},
    route::RouteCollection,
    trie::RouteTrie,
};
use crate::ports::{CacheError, TrieCache};

/// Failures while producing a trie for a route collection.
#[derive(Debug, Error)]
pub enum TrieFactoryError {
    #[error("failed to compile route trie: {0}")]
    Compile(#[from] CompileError),

    #[error("trie cache failure: {0}")]
    Cache(#[from] CacheError),
}

/// Orchestrates trie creation: consult the injected cache collaborator,
/// otherwise compile every route and write the result back. Runs once per
/// process lifetime (or per cache refresh); the returned trie is shared
/// read-only from then on.
pub struct TrieFactory {
    compiler: TrieCompiler,
    cache: Option<Arc<dyn TrieCache>>,
}

impl TrieFactory {
    /// A factory that always compiles fresh.
    pub fn new() -> Self {
        Self {
            compiler: TrieCompiler::new(),
            cache: None,
        }
    }

    /// A factory backed by a cache collaborator.
    pub fn with_cache(cache: Arc<dyn TrieCache>) -> Self {
        Self {
            compiler: TrieCompiler::new(),
            cache: Some(cache),
        }
    }

    /// Produce the trie for `routes`. A corrupt cache payload propagates
    /// as a hard error rather than triggering a silent recompile.
    pub async fn create_trie(
        &self,
        routes: &RouteCollection,
    ) -> Result<Arc<RouteTrie>, TrieFactoryError> {
        if let Some(cache) = &self.cache
            && cache.has().await?
            && let Some(trie) = cache.get().await?
        {
            info!(
                nodes = trie.node_count(),
                routes = trie.route_count(),
                "loaded route trie from cache"
            );
            return Ok(Arc::new(trie));
        }

        debug!(routes = routes.len(), "trie cache miss, compiling");
        let trie = self.compiler.compile(routes)?;

        if let Some(cache) = &self.cache {
            cache.set(&trie).await?;
        }

        Ok(Arc::new(trie))
    }
}

impl Default for TrieFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::MemoryTrieCache,
        core::{
            parser::parse_uri_template,
            route::{Route, RouteAction},
            rules::RuleFactory,
        },
    };

    fn sample_collection() -> RouteCollection {
        let factory = RuleFactory::with_builtins();
        let template = parse_uri_template("/users/:id", None, false, &factory).expect("parses");
        RouteCollection::from(vec![Route::new(
            ["GET"],
            template,
            RouteAction::new("users.show"),
        )])
    }

    #[tokio::test]
    async fn test_compiles_without_a_cache() {
        let factory = TrieFactory::new();
        let trie = factory
            .create_trie(&sample_collection())
            .await
            .expect("compiles");
        assert_eq!(trie.route_count(), 1);
    }

    #[tokio::test]
    async fn test_populates_cache_on_miss_and_reuses_it() {
        let cache = Arc::new(MemoryTrieCache::new());
        let factory = TrieFactory::with_cache(cache.clone());

        let first = factory
            .create_trie(&sample_collection())
            .await
            .expect("compiles");
        assert!(cache.has().await.expect("has"));

        // A second factory over the same cache skips compilation and
        // yields a structurally equal trie.
        let second = TrieFactory::with_cache(cache)
            .create_trie(&RouteCollection::new())
            .await
            .expect("loads from cache");
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn test_flush_forces_recompilation() {
        let cache = Arc::new(MemoryTrieCache::new());
        let factory = TrieFactory::with_cache(cache.clone());
        factory
            .create_trie(&sample_collection())
            .await
            .expect("compiles");

        cache.flush().await.expect("flushes");
        assert!(!cache.has().await.expect("has"));
    }
}
