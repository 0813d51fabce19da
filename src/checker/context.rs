// src/checker/context.rs
// =============================================================================
// The cancellation signal shared by every part of a run.
//
// A RunContext is created by the caller (main.rs arms it with the global
// --timeout) and handed to the checker. The dispatcher, every worker, the rate
// limiter, the backoff sleep and each in-flight HTTP request all race their
// blocking work against `done()`, so nothing keeps running once it fires.
//
// Two things can end a run early:
// - an explicit cancel() from the caller (e.g. Ctrl-C)
// - the deadline passing
// Whichever is observed first becomes the reason, and it never changes.
// =============================================================================

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// Why a run stopped before finishing all of its work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller cancelled the run
    Cancelled,
    /// The global deadline passed
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Cancelled => write!(f, "context canceled"),
            CancelReason::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    reason: Arc<OnceLock<CancelReason>>,
}

impl RunContext {
    // A context that only ends through cancel()
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            reason: Arc::new(OnceLock::new()),
        }
    }

    // A context that also ends once `timeout` has elapsed from now.
    // A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            ..Self::new()
        }
    }

    pub fn cancel(&self) {
        self.fire(CancelReason::Cancelled);
    }

    // Why the run ended early, or None while it is still live
    pub fn reason(&self) -> Option<CancelReason> {
        if let Some(reason) = self.reason.get() {
            return Some(*reason);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(self.fire(CancelReason::DeadlineExceeded))
            }
            _ => None,
        }
    }

    // Resolves once the context is done. Cancel-safe, so it can sit in any
    // tokio::select! next to the work it guards.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {
                        self.fire(CancelReason::DeadlineExceeded);
                    }
                }
            }
            None => self.token.cancelled().await,
        }
    }

    // Records `reason` unless an earlier one is already set, then wakes
    // everything waiting in done(). Returns the reason that stuck.
    fn fire(&self, reason: CancelReason) -> CancelReason {
        let stuck = *self.reason.get_or_init(|| reason);
        self.token.cancel();
        stuck
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_is_observed_by_clones() {
        let ctx = RunContext::new();
        let clone = ctx.clone();
        assert!(clone.reason().is_none());

        ctx.cancel();

        assert_eq!(clone.reason(), Some(CancelReason::Cancelled));
        // Already fired, so this returns right away
        clone.done().await;
    }

    #[tokio::test]
    async fn test_deadline_fires_done() {
        let ctx = RunContext::with_timeout(Duration::from_millis(50));
        let started = std::time::Instant::now();

        ctx.done().await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(ctx.reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_huge_timeout_means_no_deadline() {
        let timeout = humantime::parse_duration("500000000000y").unwrap();
        let ctx = RunContext::with_timeout(timeout);

        assert!(ctx.reason().is_none());
        ctx.cancel();
        assert_eq!(ctx.reason(), Some(CancelReason::Cancelled));
    }

    #[tokio::test]
    async fn test_first_reason_wins() {
        let ctx = RunContext::with_timeout(Duration::from_millis(20));
        ctx.cancel();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(ctx.reason(), Some(CancelReason::Cancelled));
    }
}
