use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Stable error codes that UI layers switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Any failure without a more specific code, including an open circuit
    UnknownError,

    /// HTTP 401
    Unauthorized,

    /// HTTP 404
    NotFound,

    /// HTTP 400
    BadRequest,

    /// HTTP 409
    AlreadyExists,

    /// Transport succeeded but the payload did not match the expected schema
    Serialization,
}

impl ErrorCode {
    /// Every code, in declaration order
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::UnknownError,
        ErrorCode::Unauthorized,
        ErrorCode::NotFound,
        ErrorCode::BadRequest,
        ErrorCode::AlreadyExists,
        ErrorCode::Serialization,
    ];

    /// Wire representation of the code
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Serialization => "SERIALIZATION",
        }
    }

    /// Default human-readable message for the code
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::UnknownError => "Something went wrong, please try again later",
            ErrorCode::Unauthorized => "You are not authorized to perform this action",
            ErrorCode::NotFound => "The requested resource was not found",
            ErrorCode::BadRequest => "The request was invalid",
            ErrorCode::AlreadyExists => "The resource already exists",
            ErrorCode::Serialization => "The server returned an unexpected response",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an HTTP status code onto the error taxonomy
pub fn check_error(status: u16) -> ErrorCode {
    match status {
        400 => ErrorCode::BadRequest,
        401 => ErrorCode::Unauthorized,
        404 => ErrorCode::NotFound,
        409 => ErrorCode::AlreadyExists,
        _ => ErrorCode::UnknownError,
    }
}
