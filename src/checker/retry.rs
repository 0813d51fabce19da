// src/checker/retry.rs
// =============================================================================
// Retry and exponential backoff around a single check.
//
// Attempt 1 runs immediately. Attempt i > 1 waits base_delay * 2^(i-2) first:
// 500ms, 1s, 2s, 4s, ... with the default base delay.
//
// Outcome rules:
// - no response (transport error)  -> retry if budget remains
// - response with status >= 500    -> retry if budget remains
// - response with status < 500     -> final, stop here (2xx, 3xx, 4xx)
// When the budget runs out, the last attempt's outcome is the result.
// =============================================================================

use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::context::{CancelReason, RunContext};
use super::error::CheckError;
use super::http::{check_once, AttemptOutcome};
use super::types::CheckResult;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

// Delays stop growing past this many doublings
const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    // Delay before retry number `retry` (1-based): base, 2*base, 4*base, ...
    pub fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_delay.saturating_mul(1u32 << shift)
    }

    pub fn is_retryable(outcome: &AttemptOutcome) -> bool {
        match outcome {
            AttemptOutcome::Response(status) => status.as_u16() >= 500,
            AttemptOutcome::Failed(_) => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0)
    }
}

// Checks `url`, retrying transient failures per `policy`
//
// Always produces exactly one CheckResult. Cancellation during a backoff wait
// ends the loop at once with a Cancelled error and no further attempts.
pub async fn check_with_retries(
    client: &Client,
    url: &str,
    ctx: &RunContext,
    policy: &RetryPolicy,
) -> CheckResult {
    let started = Instant::now();
    let mut retries = 0;

    loop {
        let outcome = check_once(client, url, ctx).await;

        let cancelled = matches!(&outcome, AttemptOutcome::Failed(e) if e.is_cancelled());
        if cancelled || !RetryPolicy::is_retryable(&outcome) || retries >= policy.max_retries {
            return finish(url, outcome, started, retries);
        }

        let delay = policy.backoff(retries + 1);
        debug!(
            url,
            attempt = retries + 2,
            backoff_ms = delay.as_millis() as u64,
            "Retrying request"
        );

        tokio::select! {
            biased;
            _ = ctx.done() => {
                let reason = ctx.reason().unwrap_or(CancelReason::Cancelled);
                return finish(url, AttemptOutcome::Failed(CheckError::Cancelled(reason)), started, retries);
            }
            _ = tokio::time::sleep(delay) => {}
        }

        retries += 1;
    }
}

fn finish(url: &str, outcome: AttemptOutcome, started: Instant, retries: u32) -> CheckResult {
    let (status_code, error) = match outcome {
        AttemptOutcome::Response(status) => (status.as_u16(), None),
        AttemptOutcome::Failed(e) => (0, Some(e)),
    };

    CheckResult {
        url: url.to_string(),
        status_code,
        duration: started.elapsed(),
        retries,
        error,
    }
}
