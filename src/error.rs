use thiserror::Error;

pub type Result<T> = std::result::Result<T, DexError>;

/// Failures surfaced by the list, detail and search operations.
#[derive(Error, Debug)]
pub enum DexError {
    /// Upstream unreachable or answered with a non-success status.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream answered, but not with the shape we expect.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
    /// A species reference URL without a numeric trailing segment.
    #[error("species reference has no numeric id: {0}")]
    MalformedReference(String),
}

impl From<serde_json::Error> for DexError {
    fn from(err: serde_json::Error) -> Self {
        DexError::MalformedResponse(err.to_string())
    }
}
