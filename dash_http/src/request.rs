use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::errors::RequestError;

/// HTTP methods used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// What a repository asks the client for: a path plus optional params or body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub url: String,
    /// Appended to the path of `url`, percent-encoded
    pub segments: Vec<String>,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    /// Append one path segment; `/`, `?` and `#` inside it are escaped
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append a single query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Append query parameters from a struct or map
    ///
    /// `None` fields are skipped and sequences become repeated keys.
    pub fn params<P: Serialize>(mut self, params: &P) -> Result<Self, RequestError> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    push_param(&mut self.params, &key, value);
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(RequestError::ParamsNotAnObject(json_kind(&other))),
        }
    }

    /// Attach a JSON body
    pub fn body<B: Serialize>(mut self, body: &B) -> Result<Self, RequestError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

fn push_param(params: &mut Vec<(String, String)>, key: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => params.push((key.to_string(), s)),
        Value::Array(items) => {
            for item in items {
                push_param(params, key, item);
            }
        }
        other => params.push((key.to_string(), other.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A fully resolved request handed to a [`crate::Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// Value of the first header named `name`, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }
}
