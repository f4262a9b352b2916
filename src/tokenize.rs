//! Raw text to candidate words.
//!
//! Every run of non-word characters becomes a separator; what is left between
//! separators is a word. No normalization happens here.

use std::sync::LazyLock;

use regex::Regex;

// Word characters are ASCII only: [0-9A-Za-z_]. Accented letters split words.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_]+").unwrap());

/// Split `text` into words in order of appearance, repeats included.
pub fn extract_words(text: &str) -> Vec<String> {
    NON_WORD
        .replace_all(text, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
