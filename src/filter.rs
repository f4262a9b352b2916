//! Candidate extraction: raw text to the words worth asking the user about.
//!
//! Tokens are lowercased, numbers and single characters are dropped, repeats
//! collapse to their first occurrence, then the known set and the ignored set
//! are subtracted, in that order.

use std::collections::HashSet;

use crate::context::RequestContext;
use crate::error::LexiResult;
use crate::store::WordStore;
use crate::tokenize::extract_words;

/// Shortest token (in characters) that is kept.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Whether a lowercased token is a vocabulary candidate at all.
pub fn is_candidate(token: &str) -> bool {
    token.parse::<i64>().is_err() && token.chars().count() >= MIN_TOKEN_CHARS
}

/// Lowercase, drop non-candidates, deduplicate keeping first occurrence.
///
/// No store access; the result is what [`prepare_candidates`] would return
/// against empty word sets.
pub fn normalize<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .filter(|t| is_candidate(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Extract the candidate list for `text`, minus known and ignored words.
pub fn prepare_candidates(
    store: &dyn WordStore,
    ctx: &RequestContext,
    text: &str,
) -> LexiResult<Vec<String>> {
    let words = normalize(extract_words(text));
    let total = words.len();

    ctx.check("filtering known words")?;
    let words = store.filter_known(words)?;
    ctx.check("filtering ignored words")?;
    let words = store.filter_ignored(words)?;

    tracing::debug!(total, candidates = words.len(), "candidates prepared");
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemWordStore;

    #[test]
    fn numbers_and_single_chars_are_not_candidates() {
        assert!(!is_candidate("42"));
        assert!(!is_candidate("007"));
        assert!(!is_candidate("a"));
        assert!(!is_candidate("é"));
        assert!(is_candidate("an"));
        assert!(is_candidate("4x4"));
    }

    #[test]
    fn integers_too_large_for_i64_are_kept() {
        assert!(is_candidate("99999999999999999999"));
    }

    #[test]
    fn normalize_lowercases_and_dedups_in_order() {
        assert_eq!(
            normalize(["Brown", "fox", "BROWN", "a", "12", "Fox"]),
            vec!["brown", "fox"]
        );
    }

    #[test]
    fn known_words_are_subtracted() {
        let store = MemWordStore::with_words(&["fox"], &[]);
        let out = prepare_candidates(
            &store,
            &RequestContext::background(),
            "The quick brown Fox, the 42 brown fox!",
        )
        .unwrap();
        assert_eq!(out, vec!["the", "quick", "brown"]);
    }

    #[test]
    fn two_letter_words_survive() {
        let store = MemWordStore::new();
        let out =
            prepare_candidates(&store, &RequestContext::background(), "A cat and an ox.").unwrap();
        assert_eq!(out, vec!["cat", "and", "an", "ox"]);
    }

    #[test]
    fn ignored_words_are_subtracted_after_known() {
        let store = MemWordStore::with_words(&["cat"], &["the", "cat"]);
        let out = prepare_candidates(
            &store,
            &RequestContext::background(),
            "the cat saw the dog",
        )
        .unwrap();
        assert_eq!(out, vec!["saw", "dog"]);
    }

    #[test]
    fn cancelled_request_skips_the_store() {
        let store = MemWordStore::new();
        let ctx = RequestContext::background();
        ctx.cancel();
        assert!(prepare_candidates(&store, &ctx, "hello world").is_err());
    }
}
