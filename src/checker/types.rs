// src/checker/types.rs
// =============================================================================
// Data types that flow through a run.
//
// - RunConfig:   what the caller asks for (workers, retries, rate limit)
// - CheckResult: the outcome of one URL after all of its attempts
// - RunSummary:  counts and timing for the whole run
// - RunReport:   every result plus the summary, returned by Checker::run
//
// CheckResult and RunSummary serialize straight into the JSON report.
// =============================================================================

use serde::{Serialize, Serializer};
use std::time::Duration;

use super::context::CancelReason;
use super::error::CheckError;

// Configuration for one run of the checker
//
// A RunConfig is immutable for the lifetime of the run it governs. The global
// timeout is not here: it lives in the RunContext the caller passes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Extra attempts allowed after the first one fails transiently
    pub max_retries: u32,
    /// Requests per second across all workers (0 = unlimited)
    pub rate_limit: u32,
}

impl RunConfig {
    // Worker count actually used; a zero from the caller becomes 1
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_retries: 0,
            rate_limit: 0,
        }
    }
}

// Represents the result of checking a single URL
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// The URL that was checked
    pub url: String,
    /// Final HTTP status code, 0 if no response was ever obtained
    pub status_code: u16,
    /// Time from the first attempt's start to the last attempt's end
    #[serde(rename = "duration_ns", serialize_with = "as_nanos")]
    pub duration: Duration,
    /// Number of retry attempts actually performed
    pub retries: u32,
    /// Present iff the final attempt got no HTTP response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
}

impl CheckResult {
    // Success means a response arrived and it was 2xx
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status_code)
    }
}

// Final counts for a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Number of results produced (not the input length if the run was cut short)
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    #[serde(rename = "total_duration_s", serialize_with = "as_secs_f64")]
    pub duration: Duration,
    /// Set when the run ended early
    #[serde(skip)]
    pub interrupted: Option<CancelReason>,
}

impl RunSummary {
    pub fn deadline_exceeded(&self) -> bool {
        self.interrupted == Some(CancelReason::DeadlineExceeded)
    }
}

// Everything a run produced, in arrival order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub results: Vec<CheckResult>,
    pub summary: RunSummary,
}

fn as_nanos<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status_code: u16, error: Option<CheckError>) -> CheckResult {
        CheckResult {
            url: "https://example.com".to_string(),
            status_code,
            duration: Duration::from_millis(5),
            retries: 0,
            error,
        }
    }

    #[test]
    fn test_success_classification() {
        assert!(result(200, None).is_success());
        assert!(result(204, None).is_success());
        assert!(!result(301, None).is_success());
        assert!(!result(404, None).is_success());
        assert!(!result(503, None).is_success());
        assert!(!result(0, Some(CheckError::Timeout)).is_success());
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let config = RunConfig {
            concurrency: 0,
            ..RunConfig::default()
        };
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn test_result_json_shape() {
        let value = serde_json::to_value(result(0, Some(CheckError::Timeout))).unwrap();
        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["status_code"], 0);
        assert_eq!(value["duration_ns"], 5_000_000);
        assert_eq!(value["retries"], 0);
        assert_eq!(value["error"], "request timed out");

        let value = serde_json::to_value(result(200, None)).unwrap();
        assert!(value.get("error").is_none());
    }
}
