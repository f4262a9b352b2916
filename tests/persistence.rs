//! Persistence tests for the durable word store.
//!
//! These verify that mark-ups survive a restart (close + reopen cycle) and
//! keep shaping the candidate list afterwards.

use std::thread;

use lexicard::context::RequestContext;
use lexicard::filter::prepare_candidates;
use lexicard::markup::{IGNORED_WORDS_VALUE, KNOWN_WORDS_VALUE, Markup};
use lexicard::store::{DurableWordStore, WordStore};

const TEXT: &str = "The ship sailed past the lighthouse at dawn.";

#[test]
fn markup_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let ctx = RequestContext::background();

    // First session: mark up the candidates.
    {
        let store = DurableWordStore::open(dir.path()).unwrap();
        let candidates = prepare_candidates(&store, &ctx, TEXT).unwrap();
        assert_eq!(
            candidates,
            vec!["the", "ship", "sailed", "past", "lighthouse", "at", "dawn"]
        );

        let unknown = Markup::from_pairs([
            ("the", KNOWN_WORDS_VALUE),
            ("at", KNOWN_WORDS_VALUE),
            ("past", IGNORED_WORDS_VALUE),
            ("lighthouse", "unknown"),
        ])
        .save(&store, &ctx)
        .unwrap();
        assert_eq!(unknown, vec!["lighthouse"]);
    }

    // Second session: reopen and verify.
    {
        let store = DurableWordStore::open(dir.path()).unwrap();
        assert_eq!(store.count_known().unwrap(), 2);
        assert_eq!(store.count_ignored().unwrap(), 1);
        assert_eq!(
            prepare_candidates(&store, &ctx, TEXT).unwrap(),
            vec!["ship", "sailed", "lighthouse", "dawn"]
        );
    }
}

#[test]
fn concurrent_writers_share_one_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = DurableWordStore::open(dir.path()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                let words: Vec<String> = (0..25).map(|i| format!("w{t}x{i}")).collect();
                store.save_as_known(&words).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count_known().unwrap(), 100);
    assert_eq!(store.count_ignored().unwrap(), 0);
}

#[test]
fn store_directory_is_created() {
    let dir = tempfile::TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = DurableWordStore::open(&nested).unwrap();
    store.save_as_ignored(&["zzz".to_string()]).unwrap();
    assert!(nested.join(lexicard::store::durable::DB_FILE).is_file());
}
