//! The user's mark-up of a candidate list.
//!
//! The marking form posts one field per word; the field value says where the
//! word goes. Only the first value of a repeated field counts.

use std::collections::HashSet;

use crate::context::RequestContext;
use crate::error::LexiResult;
use crate::store::WordStore;

/// Form value that files a word under the known set.
pub const KNOWN_WORDS_VALUE: &str = "known_words";
/// Form value that files a word under the ignored set.
pub const IGNORED_WORDS_VALUE: &str = "ignored_words";
/// Form value the candidate page uses for "learn this". Any other value means the same.
pub const UNKNOWN_WORDS_VALUE: &str = "unknown_words";

/// Where a marked word goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkTarget {
    Known,
    Ignored,
    Unknown,
}

impl MarkTarget {
    pub fn from_form_value(value: &str) -> Self {
        match value {
            KNOWN_WORDS_VALUE => MarkTarget::Known,
            IGNORED_WORDS_VALUE => MarkTarget::Ignored,
            _ => MarkTarget::Unknown,
        }
    }
}

/// A mark-up split into its three buckets, each in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub known: Vec<String>,
    pub ignored: Vec<String>,
    pub unknown: Vec<String>,
}

impl Markup {
    /// Interpret ordered `(word, value)` form pairs.
    ///
    /// Words are lowercased; empty words are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut markup = Markup::default();
        let mut seen = HashSet::new();
        for (word, value) in pairs {
            let word = word.as_ref().to_lowercase();
            if word.is_empty() {
                continue;
            }
            if !seen.insert(word.clone()) {
                tracing::debug!(word, "ignoring repeated mark-up field");
                continue;
            }
            match MarkTarget::from_form_value(value.as_ref()) {
                MarkTarget::Known => markup.known.push(word),
                MarkTarget::Ignored => markup.ignored.push(word),
                MarkTarget::Unknown => markup.unknown.push(word),
            }
        }
        markup
    }

    /// Persist the known and ignored buckets, returning the unknown words.
    pub fn save(self, store: &dyn WordStore, ctx: &RequestContext) -> LexiResult<Vec<String>> {
        ctx.check("saving known words")?;
        store.save_as_known(&self.known)?;
        ctx.check("saving ignored words")?;
        store.save_as_ignored(&self.ignored)?;
        tracing::info!(
            known = self.known.len(),
            ignored = self.ignored.len(),
            unknown = self.unknown.len(),
            "mark-up saved"
        );
        Ok(self.unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemWordStore, WordSet};

    #[test]
    fn values_route_words() {
        let markup = Markup::from_pairs([
            ("foo", "known_words"),
            ("bar", "ignored_words"),
            ("baz", "other"),
        ]);
        assert_eq!(markup.known, vec!["foo"]);
        assert_eq!(markup.ignored, vec!["bar"]);
        assert_eq!(markup.unknown, vec!["baz"]);
    }

    #[test]
    fn first_value_of_repeated_key_wins() {
        let markup = Markup::from_pairs([
            ("foo", "ignored_words"),
            ("foo", "known_words"),
            ("Foo", "other"),
        ]);
        assert_eq!(markup.ignored, vec!["foo"]);
        assert!(markup.known.is_empty());
        assert!(markup.unknown.is_empty());
    }

    #[test]
    fn empty_keys_are_skipped_and_order_kept() {
        let markup = Markup::from_pairs([("", "other"), ("zeta", "x"), ("alpha", "")]);
        assert_eq!(markup.unknown, vec!["zeta", "alpha"]);
    }

    #[test]
    fn save_persists_and_returns_unknown() {
        let store = MemWordStore::new();
        let unknown = Markup::from_pairs([
            ("foo", KNOWN_WORDS_VALUE),
            ("bar", IGNORED_WORDS_VALUE),
            ("baz", UNKNOWN_WORDS_VALUE),
        ])
        .save(&store, &RequestContext::background())
        .unwrap();

        assert_eq!(unknown, vec!["baz"]);
        assert!(store.contains(WordSet::Known, "foo"));
        assert!(store.contains(WordSet::Ignored, "bar"));
        assert!(!store.contains(WordSet::Known, "baz"));
    }
}
