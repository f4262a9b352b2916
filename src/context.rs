//! Per-request deadline and cancellation.
//!
//! Every store and upstream call is a suspension point. Adapters call
//! [`RequestContext::check`] before each one and size their HTTP timeouts with
//! [`RequestContext::remaining`], so a call never outlives the request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{LexiError, LexiResult};

/// Timeout used for a single upstream call when the request has no deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline and cancellation signal shared by everything one request does.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    /// A context with no deadline that is never cancelled from outside.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation. Work in flight stops at its next suspension point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Time left before the deadline, or [`DEFAULT_CALL_TIMEOUT`] when unbounded.
    ///
    /// Returns `Duration::ZERO` once the deadline has passed.
    pub fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Fail if the request was cancelled or its deadline has passed.
    ///
    /// `stage` names what was about to happen and ends up in the error.
    pub fn check(&self, stage: &str) -> LexiResult<()> {
        if self.is_cancelled() {
            return Err(LexiError::Cancelled {
                stage: stage.to_string(),
            });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(LexiError::DeadlineExceeded {
                    stage: stage.to_string(),
                });
            }
        }
        Ok(())
    }

    /// A guard that cancels this context when dropped, unless disarmed.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            ctx: Some(self.clone()),
        }
    }
}

/// Cancels its context on drop.
///
/// Held by the async side of a request; if the request future is dropped
/// (client disconnect, server shutdown) the blocking worker sees the flag.
#[derive(Debug)]
pub struct CancelOnDrop {
    ctx: Option<RequestContext>,
}

impl CancelOnDrop {
    /// Keep the context alive after this guard goes away.
    pub fn disarm(mut self) {
        self.ctx = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            ctx.cancel();
        }
    }
}
