//! Error types for location sources.

use thiserror::Error;

/// Errors a backend location source can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Row-level access policy rejected the query.
    ///
    /// Expected under restricted roles; the fetcher treats this as an empty
    /// result on the fallback tier rather than a fault.
    #[error("Access policy rejected the location query")]
    PermissionDenied,

    /// The source did not answer within its deadline.
    #[error("Location source timed out")]
    Timeout,

    /// The source failed outright (network, backend outage, bad response).
    #[error("Location source unavailable: {0}")]
    Unavailable(String),

    /// The source answered with rows this crate could not interpret.
    #[error("Malformed location data: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unavailable() {
        let err = SourceError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_display_permission_denied() {
        let err = SourceError::PermissionDenied;
        assert!(err.to_string().contains("Access policy"));
    }

    #[test]
    fn test_error_trait() {
        let err = SourceError::Timeout;
        let _: &dyn std::error::Error = &err;
    }
}
