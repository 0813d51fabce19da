// src/checker/http.rs
// =============================================================================
// This module performs a single check attempt against one URL.
//
// Key functionality:
// - Builds the shared HTTP client (10 second timeout per attempt)
// - Makes one HTTP GET request, racing it against the run's RunContext
// - Turns reqwest errors into CheckError kinds (timeout, DNS, TLS, etc.)
//
// Only the status code matters here; the body is never read. Retrying and
// backoff live one level up, in retry.rs.
// =============================================================================

use reqwest::{Client, StatusCode};
use std::error::Error as _;
use std::time::Duration;

use super::context::{CancelReason, RunContext};
use super::error::CheckError;

// Per-attempt network timeout, independent of the global run deadline
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

// What a single attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The server answered with this status (any status, including 4xx/5xx)
    Response(StatusCode),
    /// No HTTP response was obtained
    Failed(CheckError),
}

// Creates the HTTP client shared by every worker
//
// The client keeps an internal connection pool and is cheap to clone, so one
// instance serves the whole run. Redirects follow reqwest's default policy.
pub fn build_client() -> reqwest::Result<Client> {
    Client::builder().timeout(ATTEMPT_TIMEOUT).build()
}

// Issues one GET request
//
// If the context fires while the request is in flight, the request future is
// dropped (which aborts it) and the attempt fails with Cancelled.
pub async fn check_once(client: &Client, url: &str, ctx: &RunContext) -> AttemptOutcome {
    if let Some(reason) = ctx.reason() {
        return AttemptOutcome::Failed(CheckError::Cancelled(reason));
    }

    tokio::select! {
        biased;
        _ = ctx.done() => {
            let reason = ctx.reason().unwrap_or(CancelReason::Cancelled);
            AttemptOutcome::Failed(CheckError::Cancelled(reason))
        }
        result = client.get(url).send() => match result {
            Ok(response) => AttemptOutcome::Response(response.status()),
            Err(e) => AttemptOutcome::Failed(categorize_error(e)),
        },
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - A URL that could not be turned into a request
fn categorize_error(error: reqwest::Error) -> CheckError {
    // The top-level message is often just "error sending request", the
    // useful part is further down the source chain
    let detail = error_chain(&error);
    let lowered = detail.to_lowercase();

    if error.is_timeout() {
        CheckError::Timeout
    } else if error.is_redirect() {
        CheckError::TooManyRedirects
    } else if error.is_builder() {
        CheckError::InvalidRequest(detail)
    } else if lowered.contains("dns") || lowered.contains("lookup address") {
        CheckError::Dns(detail)
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl")
    {
        CheckError::Tls(detail)
    } else if error.is_connect() {
        CheckError::Connect(detail)
    } else {
        CheckError::Request(detail)
    }
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
