use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::error_code::ErrorCode;
use crate::error_code::check_error;

/// Error payload of a failed API call
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,

    /// HTTP status when the failure came from a response
    pub status: Option<u16>,

    /// Diagnostic detail, not meant for end users
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, status: None, message: message.into() }
    }

    /// Build from an HTTP error status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self { code: check_error(status), status: Some(status), message: message.into() }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Serialization, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Message suitable for display in the dashboard
    pub fn user_message(&self) -> &'static str {
        self.code.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        let err = ApiError::from_status(409, "duplicate code");
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.status, Some(409));
        assert_eq!(err.to_string(), "ALREADY_EXISTS: duplicate code");
    }

    #[test]
    fn test_from_unmapped_status() {
        let err = ApiError::from_status(503, "unavailable");
        assert_eq!(err.code, ErrorCode::UnknownError);
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_serialization_has_no_status() {
        let err = ApiError::serialization("invalid type");
        assert_eq!(err.code, ErrorCode::Serialization);
        assert_eq!(err.status, None);
        assert_eq!(err.user_message(), ErrorCode::Serialization.message());
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::from_status(404, "missing");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "NOT_FOUND");
        assert_eq!(value["status"], 404);
    }
}
