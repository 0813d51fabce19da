// src/output.rs
// =============================================================================
// Renders check results.
//
// Text mode: TextSink logs each result as it arrives, then log_summary() logs
// the totals. Everything goes through `tracing` to stderr.
//
// JSON mode: write_json() prints one document on stdout once the run is over:
//
//   {
//     "results": [{"url": ..., "status_code": 200, "duration_ns": ..., "retries": 0}],
//     "summary": {"total": 1, "ok": 1, "fail": 0, "total_duration_s": 0.12}
//   }
// =============================================================================

use anyhow::Result;
use std::io::Write;
use tracing::{error, info, warn};

use crate::checker::{CancelReason, CheckResult, ResultSink, RunReport, RunSummary};

// Streams each result to the log as soon as the checker reports it
#[derive(Debug, Default)]
pub struct TextSink;

impl ResultSink for TextSink {
    fn on_result(&mut self, r: &CheckResult) {
        match &r.error {
            Some(e) => error!(
                url = %r.url,
                error = %e,
                retries = r.retries,
                duration = ?r.duration,
                "Check failed"
            ),
            None if r.is_success() => info!(
                url = %r.url,
                status = r.status_code,
                retries = r.retries,
                duration = ?r.duration,
                "Check success"
            ),
            None => warn!(
                url = %r.url,
                status = r.status_code,
                retries = r.retries,
                duration = ?r.duration,
                "Check returned non-2xx status"
            ),
        }
    }
}

pub fn log_summary(summary: &RunSummary) {
    info!(
        total = summary.total,
        ok = summary.ok,
        fail = summary.fail,
        duration = ?summary.duration,
        "Check completed"
    );
}

// Surfaces an early end of the run separately from per-URL failures
pub fn log_interruption(summary: &RunSummary) {
    match summary.interrupted {
        Some(CancelReason::DeadlineExceeded) => {
            error!(produced = summary.total, "Global timeout reached")
        }
        Some(CancelReason::Cancelled) => warn!(produced = summary.total, "Run cancelled"),
        None => {}
    }
}

// Writes the whole report as pretty-printed JSON
pub fn write_json<W: Write>(mut writer: W, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckError;
    use std::time::Duration;

    fn report() -> RunReport {
        let results = vec![
            CheckResult {
                url: "https://ok.test".to_string(),
                status_code: 200,
                duration: Duration::from_nanos(1_500),
                retries: 0,
                error: None,
            },
            CheckResult {
                url: "https://down.test".to_string(),
                status_code: 0,
                duration: Duration::from_millis(2),
                retries: 1,
                error: Some(CheckError::Connect("connection refused".into())),
            },
        ];
        RunReport {
            results,
            summary: RunSummary {
                total: 2,
                ok: 1,
                fail: 1,
                duration: Duration::from_millis(1500),
                interrupted: None,
            },
        }
    }

    #[test]
    fn test_json_document() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let results = value["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["url"], "https://ok.test");
        assert_eq!(results[0]["status_code"], 200);
        assert_eq!(results[0]["duration_ns"], 1_500);
        assert!(results[0].get("error").is_none());
        assert_eq!(results[1]["retries"], 1);
        assert_eq!(results[1]["error"], "connection failed: connection refused");

        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["ok"], 1);
        assert_eq!(value["summary"]["fail"], 1);
        assert_eq!(value["summary"]["total_duration_s"], 1.5);
    }
}
