//! In-memory word store backed by DashMap.
//!
//! Same key layout as the durable store. All data is lost on process exit.

use dashmap::DashMap;

use crate::store::{StoreResult, WordSet, WordStore};

/// Concurrent in-memory word store using a sharded hashmap.
#[derive(Debug, Default)]
pub struct MemWordStore {
    data: DashMap<String, String>,
}

impl MemWordStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Create a store pre-populated with `known` and `ignored` words.
    pub fn with_words(known: &[&str], ignored: &[&str]) -> Self {
        let store = Self::new();
        for word in known {
            store.data.insert(WordSet::Known.key(word), word.to_string());
        }
        for word in ignored {
            store
                .data
                .insert(WordSet::Ignored.key(word), word.to_string());
        }
        store
    }

    /// Whether `word` is in `set`.
    pub fn contains(&self, set: WordSet, word: &str) -> bool {
        self.data.contains_key(&set.key(word))
    }
}

impl WordStore for MemWordStore {
    fn save(&self, set: WordSet, words: &[String]) -> StoreResult<()> {
        for word in words {
            self.data.insert(set.key(word), word.clone());
        }
        Ok(())
    }

    fn filter_out(&self, set: WordSet, words: Vec<String>) -> StoreResult<Vec<String>> {
        Ok(words
            .into_iter()
            .filter(|w| !self.contains(set, w))
            .collect())
    }

    fn count(&self, set: WordSet) -> StoreResult<usize> {
        let prefix = set.prefix();
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .count())
    }
}
