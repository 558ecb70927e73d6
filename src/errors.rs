use thiserror::Error;

/// Failures of a single participant lookup.
///
/// Every variant aborts the lookup; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS or timeout failure, an unexpected HTTP status, or a body
    /// that is not the JSON shape returned by `selectRows`.
    #[error("Transport error: {0}")]
    TransportError(String),
    /// The server rejected the request with 401 or 403.
    #[error("Authentication rejected by LabKey (HTTP {status})")]
    AuthError { status: u16 },
    /// The query matched zero or several rows.
    #[error("Expected exactly one row for participant ID {identifier}, got {row_count}")]
    MultipleOrNoMatch { identifier: String, row_count: i64 },
    /// The matched row lacks a required field or carries an unparseable value.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    /// The query was rejected before any request was made.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::TransportError(err.to_string())
    }
}

impl FetchError {
    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::InvalidQuery(_) => 2,
            FetchError::TransportError(_) => 3,
            FetchError::AuthError { .. } => 4,
            FetchError::MultipleOrNoMatch { .. } => 5,
            FetchError::MalformedRecord(_) => 6,
        }
    }
}
