// src/checker/error.rs
// =============================================================================
// Errors produced while checking a URL.
//
// Every per-attempt variant means "no HTTP response was obtained". The retry
// policy treats them all the same way (retryable); the kind only changes the
// message that ends up in the CheckResult.
// =============================================================================

use serde::{Serialize, Serializer};

use super::context::CancelReason;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("request timed out")]
    Timeout,

    #[error("could not resolve hostname: {0}")]
    Dns(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("TLS/SSL error: {0}")]
    Tls(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("{0}")]
    Cancelled(CancelReason),
}

impl CheckError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CheckError::Cancelled(_))
    }
}

// Results carry the error as its display string in JSON output
impl Serialize for CheckError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_messages() {
        let err = CheckError::Cancelled(CancelReason::DeadlineExceeded);
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "context deadline exceeded");
        assert!(!CheckError::Timeout.is_cancelled());
    }

    #[test]
    fn test_serializes_as_message() {
        let json = serde_json::to_string(&CheckError::Connect("refused".into())).unwrap();
        assert_eq!(json, "\"connection failed: refused\"");
    }
}
