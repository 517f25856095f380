use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: StatusCode },

    #[error("response body is empty")]
    EmptyBody,

    #[error("after {attempts} attempts, last error: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<DispatchError>,
    },

    #[error("operation cancelled: deadline exceeded")]
    Cancelled,

    #[error("failed to fetch users: {0}")]
    FetchError(#[source] Box<DispatchError>),

    #[error("failed to push users: {0}")]
    PushError(#[source] Box<DispatchError>),

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl DispatchError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DispatchError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
