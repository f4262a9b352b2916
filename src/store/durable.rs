//! ACID-durable word store backed by redb.
//!
//! All writes go through transactions. Reads use MVCC snapshots, so concurrent
//! requests never block each other on a filter or a count.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::StoreError;
use crate::store::{StoreResult, WordSet, WordStore};

/// Table holding both sets (`k:`/`i:` keys → token).
const WORDS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("words");

/// File name of the database inside the store directory.
pub const DB_FILE: &str = "lexicard.redb";

fn unavailable<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Unavailable {
        message: format!("{op} failed: {e}"),
    }
}

/// Word store persisted in a single redb file.
#[derive(Clone)]
pub struct DurableWordStore {
    db: Arc<Database>,
}

impl DurableWordStore {
    /// Open or create the store in the given directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join(DB_FILE);
        let db = Database::create(&db_path).map_err(|e| StoreError::Unavailable {
            message: format!("failed to open redb at {}: {e}", db_path.display()),
        })?;

        // Create the table up front so read transactions never see it missing.
        let txn = db.begin_write().map_err(unavailable("begin_write"))?;
        txn.open_table(WORDS_TABLE)
            .map_err(unavailable("open_table"))?;
        txn.commit().map_err(unavailable("commit"))?;

        tracing::debug!(path = %db_path.display(), "word store opened");
        Ok(Self { db: Arc::new(db) })
    }
}

impl WordStore for DurableWordStore {
    fn save(&self, set: WordSet, words: &[String]) -> StoreResult<()> {
        if words.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin_write().map_err(unavailable("begin_write"))?;
        {
            let mut table = txn
                .open_table(WORDS_TABLE)
                .map_err(unavailable("open_table"))?;
            for word in words {
                table
                    .insert(set.key(word).as_str(), word.as_str())
                    .map_err(unavailable("insert"))?;
            }
        }
        txn.commit().map_err(unavailable("commit"))?;
        tracing::debug!(%set, count = words.len(), "saved words");
        Ok(())
    }

    fn filter_out(&self, set: WordSet, words: Vec<String>) -> StoreResult<Vec<String>> {
        let txn = self.db.begin_read().map_err(unavailable("begin_read"))?;
        let table = txn
            .open_table(WORDS_TABLE)
            .map_err(unavailable("open_table"))?;

        let mut kept = Vec::with_capacity(words.len());
        for word in words {
            let present = table
                .get(set.key(&word).as_str())
                .map_err(unavailable("get"))?
                .is_some();
            if !present {
                kept.push(word);
            }
        }
        Ok(kept)
    }

    fn count(&self, set: WordSet) -> StoreResult<usize> {
        let txn = self.db.begin_read().map_err(unavailable("begin_read"))?;
        let table = txn
            .open_table(WORDS_TABLE)
            .map_err(unavailable("open_table"))?;

        let prefix = set.prefix();
        let mut count = 0;
        for entry in table.range(prefix..).map_err(unavailable("range"))? {
            let (key, _) = entry.map_err(unavailable("range"))?;
            if !key.value().starts_with(prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }
}

impl std::fmt::Debug for DurableWordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableWordStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn save_filter_count() {
        let dir = TempDir::new().unwrap();
        let store = DurableWordStore::open(dir.path()).unwrap();

        store.save(WordSet::Known, &words(&["fox", "dog"])).unwrap();
        assert_eq!(store.count(WordSet::Known).unwrap(), 2);
        assert_eq!(store.count(WordSet::Ignored).unwrap(), 0);

        let kept = store
            .filter_out(WordSet::Known, words(&["cat", "fox", "owl", "dog"]))
            .unwrap();
        assert_eq!(kept, words(&["cat", "owl"]));
    }

    #[test]
    fn saving_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = DurableWordStore::open(dir.path()).unwrap();

        store.save(WordSet::Ignored, &words(&["the"])).unwrap();
        store.save(WordSet::Ignored, &words(&["the", "the"])).unwrap();
        assert_eq!(store.count(WordSet::Ignored).unwrap(), 1);
    }

    #[test]
    fn sets_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = DurableWordStore::open(dir.path()).unwrap();

        store.save(WordSet::Known, &words(&["ship"])).unwrap();
        assert_eq!(
            store.filter_out(WordSet::Ignored, words(&["ship"])).unwrap(),
            words(&["ship"])
        );
        assert_eq!(store.count(WordSet::Ignored).unwrap(), 0);
    }

    #[test]
    fn empty_save_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = DurableWordStore::open(dir.path()).unwrap();
        store.save(WordSet::Known, &[]).unwrap();
        assert_eq!(store.count(WordSet::Known).unwrap(), 0);
    }

    #[test]
    fn fresh_store_reads_without_writes() {
        let dir = TempDir::new().unwrap();
        let store = DurableWordStore::open(dir.path()).unwrap();
        assert_eq!(store.count(WordSet::Known).unwrap(), 0);
        assert_eq!(
            store.filter_out(WordSet::Known, words(&["a"])).unwrap(),
            words(&["a"])
        );
    }

    #[test]
    fn persistence_across_reopens() {
        let dir = TempDir::new().unwrap();

        {
            let store = DurableWordStore::open(dir.path()).unwrap();
            store.save(WordSet::Known, &words(&["persist"])).unwrap();
        }

        let store = DurableWordStore::open(dir.path()).unwrap();
        assert_eq!(store.count(WordSet::Known).unwrap(), 1);
        assert!(store
            .filter_out(WordSet::Known, words(&["persist"]))
            .unwrap()
            .is_empty());
    }
}
