//! Rich diagnostic error types for lexicard.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. Every error is fatal to
//! the request that raised it; nothing is retried.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dictionary::DictionaryError;
use crate::images::ImageError;
use crate::sink::SinkError;

/// Top-level error type for lexicard.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the log line written for a failed request.
#[derive(Debug, Error, Diagnostic)]
pub enum LexiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Images(#[from] ImageError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("bad request: {message}")]
    #[diagnostic(
        code(lexicard::request::bad_request),
        help("The submitted form could not be bound. Resubmit it from the page that produced it.")
    )]
    BadRequest { message: String },

    #[error("request cancelled during {stage}")]
    #[diagnostic(
        code(lexicard::request::cancelled),
        help("The client went away before the request finished. Uploads made so far are kept.")
    )]
    Cancelled { stage: String },

    #[error("request deadline exceeded during {stage}")]
    #[diagnostic(
        code(lexicard::request::deadline),
        help(
            "The request ran out of time. Raise LEXICARD_REQUEST_TIMEOUT_SECS \
             or submit fewer words at once."
        )
    )]
    DeadlineExceeded { stage: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(lexicard::store::io),
        help(
            "A filesystem operation failed. Check that the store directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("word store unavailable: {message}")]
    #[diagnostic(
        code(lexicard::store::unavailable),
        help(
            "The embedded word store could not complete the operation. \
             Check LEXICARD_STORE_PATH and that no other process holds the database open."
        )
    )]
    Unavailable { message: String },
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(
        "images word and definitions word aren't equal at position {index}: \
         images word: {images_word}, definitions word: {dictionary_word}"
    )]
    #[diagnostic(
        code(lexicard::pipeline::alignment_mismatch),
        help(
            "The dictionary and image search returned results in a different order \
             than the words were sent. This is an upstream contract violation; \
             nothing was uploaded."
        )
    )]
    AlignmentMismatch {
        index: usize,
        dictionary_word: String,
        images_word: String,
    },

    #[error("{source_name} returned {actual} results for a batch of {expected} words")]
    #[diagnostic(
        code(lexicard::pipeline::batch_length),
        help("Every upstream must answer once per requested word; nothing was uploaded.")
    )]
    BatchLength {
        source_name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "not enough images for \"{word}\": {plain} plain and {clarified} clarified, \
         need {required} of each"
    )]
    #[diagnostic(
        code(lexicard::pipeline::insufficient_images),
        help(
            "The image search returned too few PNG/JPEG results for this word. \
             Remove it from the batch or check the search engine configuration."
        )
    )]
    InsufficientImages {
        word: String,
        plain: usize,
        clarified: usize,
        required: usize,
    },
}

/// Convenience alias for functions returning lexicard results.
pub type LexiResult<T> = std::result::Result<T, LexiError>;
