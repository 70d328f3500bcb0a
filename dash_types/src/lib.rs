//! # dash_types
//!
//! Result and error taxonomy shared by the dashboard API client and its repositories

pub mod error;
pub mod error_code;
pub mod result;

pub use error::ApiError;
pub use error_code::ErrorCode;
pub use error_code::check_error;
pub use result::ApiResult;
pub use result::Fold;
