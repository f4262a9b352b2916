//! Known / ignored word sets.
//!
//! Two sets live side by side in one flat key space, separated by a key
//! prefix per set:
//!
//! - `k:<token>`: words the user already knows
//! - `i:<token>`: words the user chose to ignore
//!
//! The stored value is the token itself and is never read back. Counts are a
//! prefix scan. Two backends implement [`WordStore`]:
//!
//! - [`DurableWordStore`]: ACID, survives restarts (redb)
//! - [`MemWordStore`]: concurrent hashmap, for tests and dry runs (DashMap)

pub mod durable;
pub mod mem;

use std::fmt;

pub use durable::DurableWordStore;
pub use mem::MemWordStore;

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One of the two persisted word sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordSet {
    Known,
    Ignored,
}

impl WordSet {
    /// Key prefix that namespaces this set.
    pub const fn prefix(self) -> &'static str {
        match self {
            WordSet::Known => "k:",
            WordSet::Ignored => "i:",
        }
    }

    /// Storage key for `word` in this set.
    pub fn key(self, word: &str) -> String {
        format!("{}{word}", self.prefix())
    }
}

impl fmt::Display for WordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordSet::Known => f.write_str("known"),
            WordSet::Ignored => f.write_str("ignored"),
        }
    }
}

/// Persistent membership store for the known and ignored sets.
///
/// Implementations must be safe to share across concurrent requests. Writes
/// are additive and idempotent; there is no removal.
pub trait WordStore: Send + Sync {
    /// Add every word to `set`. An empty slice is a no-op.
    fn save(&self, set: WordSet, words: &[String]) -> StoreResult<()>;

    /// Keep the words that are NOT in `set`, in input order.
    ///
    /// One lookup per input word.
    fn filter_out(&self, set: WordSet, words: Vec<String>) -> StoreResult<Vec<String>>;

    /// Number of words in `set`.
    fn count(&self, set: WordSet) -> StoreResult<usize>;

    fn save_as_known(&self, words: &[String]) -> StoreResult<()> {
        self.save(WordSet::Known, words)
    }

    fn save_as_ignored(&self, words: &[String]) -> StoreResult<()> {
        self.save(WordSet::Ignored, words)
    }

    fn filter_known(&self, words: Vec<String>) -> StoreResult<Vec<String>> {
        self.filter_out(WordSet::Known, words)
    }

    fn filter_ignored(&self, words: Vec<String>) -> StoreResult<Vec<String>> {
        self.filter_out(WordSet::Ignored, words)
    }

    fn count_known(&self) -> StoreResult<usize> {
        self.count(WordSet::Known)
    }

    fn count_ignored(&self) -> StoreResult<usize> {
        self.count(WordSet::Ignored)
    }
}
