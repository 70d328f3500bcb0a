//! Response validation
//!
//! Shape, types, optional fields, defaults and enum constraints are checked by
//! serde while deserializing. Constraints serde cannot express go in
//! [`Schema::validate`].

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Root path used when a failure is not tied to a field
pub const ROOT: &str = "$";

/// A payload that did not conform to the expected schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema mismatch at {path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }

    /// Error for a named field of the root object
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::new(format!("{ROOT}.{field}"), message)
    }

    /// Prefix the path with the position of the enclosing element
    fn nested(self, prefix: &str) -> Self {
        let rest = self.path.strip_prefix(ROOT).unwrap_or(&self.path);
        Self { path: format!("{prefix}{rest}"), message: self.message }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ROOT, err.to_string())
    }
}

/// Expected shape of a response body
pub trait Schema: DeserializeOwned {
    /// Checks beyond the structural ones performed by deserialization
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Parse and validate a raw payload
///
/// An empty payload is read as JSON `null`, so `()` and `Option` models
/// accept bodiless responses.
pub fn parse<M: Schema>(payload: &[u8]) -> Result<M, SchemaError> {
    let model: M = if payload.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)?
    } else {
        serde_json::from_slice(payload)?
    };

    model.validate()?;
    Ok(model)
}

impl Schema for () {}
impl Schema for bool {}
impl Schema for String {}
impl Schema for i32 {}
impl Schema for i64 {}
impl Schema for u32 {}
impl Schema for u64 {}
impl Schema for f64 {}
impl Schema for serde_json::Value {}

impl<M: Schema> Schema for Option<M> {
    fn validate(&self) -> Result<(), SchemaError> {
        self.as_ref().map_or(Ok(()), Schema::validate)
    }
}

impl<M: Schema> Schema for Vec<M> {
    fn validate(&self) -> Result<(), SchemaError> {
        for (index, item) in self.iter().enumerate() {
            item.validate().map_err(|err| err.nested(&format!("{ROOT}[{index}]")))?;
        }
        Ok(())
    }
}
