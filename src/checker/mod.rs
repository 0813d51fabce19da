// src/checker/mod.rs
// =============================================================================
// This module contains the concurrent URL check engine.
//
// Submodules:
// - context: RunContext, the cancellation signal shared by a whole run
// - http:    one HTTP GET attempt against one URL
// - retry:   retry/backoff policy wrapped around the single attempt
// - limiter: token-bucket rate limiter shared by all workers
// - pool:    dispatcher, worker pool and aggregation (the Checker itself)
// - sink:    live per-result callback
// - types:   RunConfig, CheckResult, RunSummary, RunReport
// - error:   CheckError
//
// This file (mod.rs) is the module root - it re-exports the public API so the
// rest of the application can write `checker::Checker` and friends.
// =============================================================================

mod context;
mod error;
mod http;
mod limiter;
mod pool;
mod retry;
mod sink;
mod types;

pub use context::{CancelReason, RunContext};
pub use error::CheckError;
pub use pool::Checker;
pub use retry::RetryPolicy;
pub use sink::{Discard, ResultSink};
pub use types::{CheckResult, RunConfig, RunReport, RunSummary};
