pub mod trie_cache;

pub use trie_cache::{CacheError, CacheResult, TrieCache};
