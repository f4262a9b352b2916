//! Per-request lifecycle.
//!
//! A request moves forward through
//! `Parsing → Filtering → Presenting → Marking → Enriching → Uploading → Done`
//! and may drop to `Failed` from anywhere. A single HTTP request only walks
//! the slice of the chain its handler covers. Nothing here is persisted.

use std::fmt;

/// Where a request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Parsing,
    Filtering,
    Presenting,
    Marking,
    Enriching,
    Uploading,
    Done,
    Failed,
}

impl Stage {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Forward moves may skip stages; `Done` and `Failed` are terminal.
    pub fn can_advance_to(self, next: Stage) -> bool {
        match self {
            Stage::Done | Stage::Failed => false,
            _ if next == Stage::Failed => true,
            _ => next > self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Parsing => "parsing",
            Stage::Filtering => "filtering",
            Stage::Presenting => "presenting",
            Stage::Marking => "marking",
            Stage::Enriching => "enriching",
            Stage::Uploading => "uploading",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs the stage of one request.
#[derive(Debug)]
pub struct StageTracker {
    current: Stage,
    words: usize,
}

impl StageTracker {
    /// Start tracking at `stage` for a request touching `words` words.
    pub fn start(stage: Stage, words: usize) -> Self {
        tracing::debug!(stage = %stage, words, "request stage");
        Self {
            current: stage,
            words,
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Update the word count carried in subsequent log lines.
    pub fn set_words(&mut self, words: usize) {
        self.words = words;
    }

    /// Move to `next`. Illegal moves are logged and ignored.
    pub fn advance(&mut self, next: Stage) {
        if !self.current.can_advance_to(next) {
            tracing::warn!(from = %self.current, to = %next, "ignoring illegal stage transition");
            return;
        }
        tracing::debug!(from = %self.current, to = %next, words = self.words, "request stage");
        self.current = next;
    }

    /// Move to `Failed`, returning the stage the failure happened in.
    pub fn fail(&mut self) -> Stage {
        let at = self.current;
        self.advance(Stage::Failed);
        at
    }
    /// Pass `result` through, moving to `Failed` if it is an error.
    pub fn track<T, E>(&mut self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.fail();
        }
        result
    }
}
