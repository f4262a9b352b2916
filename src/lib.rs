// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # lexicard
//!
//! Turns a pasted text into vocabulary flashcards.
//!
//! ## Flow
//!
//! - **Tokenize** (`tokenize`): split raw text into word tokens
//! - **Filter** (`filter`): lowercase, dedup, drop numbers and one-letter tokens,
//!   subtract the words already marked known or ignored in the `store`
//! - **Mark up** (`markup`): the user files each candidate as known, ignored or unknown
//! - **Enrich** (`pipeline`): definitions and examples from the `dictionary`, eight
//!   pictures from two `images` searches, one card per word
//! - **Upload** (`sink`): one notebook page per card, in input order
//!
//! ## Library usage
//!
//! ```no_run
//! use lexicard::context::RequestContext;
//! use lexicard::filter::prepare_candidates;
//! use lexicard::store::{MemWordStore, WordStore};
//!
//! let store = MemWordStore::with_words(&["the"], &[]);
//! let ctx = RequestContext::background();
//! let candidates = prepare_candidates(&store, &ctx, "The cat and the ox").unwrap();
//! assert_eq!(candidates, vec!["cat", "and", "ox"]);
//! ```

pub mod config;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod images;
pub mod markup;
pub mod paths;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod sink;
pub mod store;
pub mod tokenize;
pub mod word;
