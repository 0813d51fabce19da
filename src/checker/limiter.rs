// src/checker/limiter.rs
// =============================================================================
// Token-bucket rate limiter shared by all workers.
//
// The bucket holds at most one token (burst 1) and refills at `rate` tokens
// per second, so request starts are spaced at least 1/rate seconds apart.
// After an idle period the next caller gets its token immediately.
//
// How admission works:
// - `next` is the earliest instant the next token becomes available
// - a caller locks `next`, sleeps until that instant, then pushes it forward
//   by one interval
// - tokio's Mutex hands out the lock in FIFO order, so under contention
//   workers are admitted roughly in arrival order and nobody starves
// - the lock wait and the sleep both race the RunContext; a cancelled caller
//   leaves `next` untouched
// =============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::context::{CancelReason, RunContext};
use super::error::CheckError;

#[derive(Debug)]
pub struct RateLimiter {
    /// None = unlimited
    interval: Option<Duration>,
    next: Mutex<Instant>,
}

impl RateLimiter {
    // Creates a limiter admitting `rate` requests per second (0 = unlimited)
    pub fn per_second(rate: u32) -> Self {
        let interval = (rate > 0).then(|| Duration::from_secs(1) / rate);
        Self {
            interval,
            next: Mutex::new(Instant::now()),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.interval.is_none()
    }

    // Waits until a token is available
    //
    // Returns Err(CheckError::Cancelled) if the context fires first; the
    // caller must then abandon the job it was about to start.
    pub async fn acquire(&self, ctx: &RunContext) -> Result<(), CheckError> {
        let Some(interval) = self.interval else {
            return Ok(());
        };

        let mut next = tokio::select! {
            biased;
            _ = ctx.done() => return Err(cancelled(ctx)),
            guard = self.next.lock() => guard,
        };

        let ready_at = (*next).max(Instant::now());
        tokio::select! {
            biased;
            _ = ctx.done() => return Err(cancelled(ctx)),
            _ = tokio::time::sleep_until(ready_at) => {}
        }

        *next = ready_at + interval;
        Ok(())
    }
}

fn cancelled(ctx: &RunContext) -> CheckError {
    CheckError::Cancelled(ctx.reason().unwrap_or(CancelReason::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unlimited_never_waits() {
        let limiter = RateLimiter::per_second(0);
        let ctx = RunContext::new();
        assert!(limiter.is_unlimited());

        let started = std::time::Instant::now();
        for _ in 0..1000 {
            limiter.acquire(&ctx).await.unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_first_token_is_immediate() {
        let limiter = RateLimiter::per_second(1);
        let ctx = RunContext::new();

        let started = std::time::Instant::now();
        limiter.acquire(&ctx).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_rate_bounds_starts_under_contention() {
        // 20/s with 8 concurrent callers for ~500ms: at most 20*0.5 + 1 starts
        let limiter = Arc::new(RateLimiter::per_second(20));
        let ctx = RunContext::with_timeout(Duration::from_millis(500));
        let started = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            let ctx = ctx.clone();
            let started = started.clone();
            handles.push(tokio::spawn(async move {
                while limiter.acquire(&ctx).await.is_ok() {
                    started.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let count = started.load(std::sync::atomic::Ordering::SeqCst);
        assert!(count <= 11, "too many starts: {}", count);
        assert!(count >= 5, "too few starts: {}", count);
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let limiter = Arc::new(RateLimiter::per_second(1));
        let ctx = RunContext::new();
        // Take the only token so the next caller has to wait ~1s
        limiter.acquire(&ctx).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { limiter.acquire(&ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let cancelled_at = std::time::Instant::now();
        ctx.cancel();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(CheckError::Cancelled(_))));
        assert!(cancelled_at.elapsed() < Duration::from_millis(500));
    }
}
