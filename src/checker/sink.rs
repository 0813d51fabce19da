// src/checker/sink.rs
// =============================================================================
// Live per-result callback.
//
// The checker calls `on_result` once for every CheckResult as it arrives, in
// arrival order (not input order). Text output uses this to stream results;
// JSON output passes a no-op and renders the final RunReport instead.
// =============================================================================

use super::types::CheckResult;

pub trait ResultSink {
    fn on_result(&mut self, result: &CheckResult);
}

// Any FnMut(&CheckResult) closure works as a sink
impl<F> ResultSink for F
where
    F: FnMut(&CheckResult),
{
    fn on_result(&mut self, result: &CheckResult) {
        self(result)
    }
}

// Sink that ignores every result
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ResultSink for Discard {
    fn on_result(&mut self, _result: &CheckResult) {}
}
