//! Errors raised while talking to the agent backend.

use reqwest::StatusCode;

/// Result type for backend round-trips.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure of a single request against the agent backend.
///
/// None of these are fatal to a panel session: status and command failures are
/// logged and swallowed, search failures collapse into one generic message.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend answered but flagged the operation as failed (`ok: false`).
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

impl BackendError {
    /// Max characters of response body kept in a `Status` error.
    pub const BODY_EXCERPT_LEN: usize = 200;

    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        let body = body.chars().take(Self::BODY_EXCERPT_LEN).collect();
        BackendError::Status { status, body }
    }
}
