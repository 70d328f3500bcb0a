use dash_types::ApiError;
use dash_types::ErrorCode;
use thiserror::Error;

/// Transport-level failures seen inside the client
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Circuit breaker open")]
    CircuitBreakerOpen,

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl HttpError {
    /// HTTP status carried by the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            HttpError::RequestFailed(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, HttpError::CircuitBreakerOpen)
    }
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        match err.status() {
            Some(status) => ApiError::from_status(status, err.to_string()),
            None => ApiError::new(ErrorCode::UnknownError, err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;

/// Failures while building a request descriptor
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to serialize request data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Query parameters must serialize to an object, got {0}")]
    ParamsNotAnObject(&'static str),
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}
