//! Error types for the inquest library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for inquest operations.
#[derive(Debug, Error)]
pub enum InquestError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing CSV/TSV data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// File exceeds the configured size limit.
    #[error("File too large: '{path}' is {size} bytes (limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The dataset cannot be profiled (no columns, no rows, or no usable columns).
    #[error("Cannot profile dataset '{dataset}': {reason}")]
    Profiling { dataset: String, reason: String },

    /// Caller supplied an unusable request (e.g. zero questions).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A question set violated its count contract. Indicates a bug, not bad input.
    #[error("Count invariant violated for {scope}: expected {expected}, produced {actual}")]
    CountInvariant {
        scope: String,
        expected: usize,
        actual: usize,
    },

    /// A scope pipeline attempted a transition its state machine forbids.
    #[error("Invalid state transition for {scope}: {from} -> {to}")]
    StateTransition {
        scope: String,
        from: String,
        to: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InquestError {
    /// Create a profiling error for a dataset.
    pub fn profiling(dataset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Profiling {
            dataset: dataset.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error describes an unusable input dataset.
    pub fn is_profiling(&self) -> bool {
        matches!(self, Self::Profiling { .. } | Self::EmptyData(_))
    }
}

/// Result type alias for inquest operations.
pub type Result<T> = std::result::Result<T, InquestError>;

/// Failure of one call to an external text-generation service.
///
/// Every variant is recoverable: the fallback controller absorbs it and
/// switches the run to offline generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service (or the shared request budget) refused the call.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The call did not complete within the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Any other transport, status, or payload failure.
    #[error("service error: {0}")]
    ServiceError(String),
}

impl GenerationError {
    /// Creates a rate limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited(message.into())
    }

    /// Creates a service error.
    pub fn service(message: impl Into<String>) -> Self {
        Self::ServiceError(message.into())
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimited(_) => "rate_limited",
            Self::Timeout { .. } => "timeout",
            Self::ServiceError(_) => "service_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiling_error_message() {
        let err = InquestError::profiling("sales.csv", "no rows");
        assert!(err.is_profiling());
        assert_eq!(err.to_string(), "Cannot profile dataset 'sales.csv': no rows");
    }

    #[test]
    fn test_generation_error_kinds() {
        assert_eq!(GenerationError::rate_limited("429").kind(), "rate_limited");
        assert_eq!(GenerationError::Timeout { timeout_secs: 5 }.kind(), "timeout");
        assert_eq!(GenerationError::service("boom").kind(), "service_error");
    }
}
