//! Scripted in-memory transport for tests

use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;

use crate::errors::HttpError;
use crate::errors::Result;
use crate::request::TransportRequest;
use crate::transport::RawResponse;
use crate::transport::Transport;
use crate::transport::TransportFuture;

/// One scripted outcome
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// 2xx with a raw body
    Body(u16, Bytes),
    /// Non-2xx status
    Status(u16, String),
    /// Network failure before any response
    Network(String),
}

impl MockReply {
    pub fn json(value: &Value) -> Self {
        MockReply::Body(200, Bytes::from(value.to_string()))
    }

    fn into_result(self) -> Result<RawResponse> {
        match self {
            MockReply::Body(status, body) => Ok(RawResponse { status, body }),
            MockReply::Status(status, body) => Err(HttpError::Status { status, body }),
            MockReply::Network(message) => Err(HttpError::Transport(message)),
        }
    }
}

/// Transport returning queued replies in order, then a fallback
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    fallback: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply
    pub fn push(&self, reply: MockReply) -> &Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Queue a 200 response with a JSON body
    pub fn push_json(&self, value: Value) -> &Self {
        self.push(MockReply::json(&value))
    }

    /// Queue an error status
    pub fn push_status(&self, status: u16) -> &Self {
        self.push(MockReply::Status(status, String::new()))
    }

    /// Reply used once the queue is empty
    pub fn always(&self, reply: MockReply) -> &Self {
        *self.fallback.lock() = Some(reply);
        self
    }

    /// Number of `send` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    fn next_reply(&self) -> Option<MockReply> {
        self.replies.lock().pop_front().or_else(|| self.fallback.lock().clone())
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);

        let reply = self.next_reply();
        Box::pin(async move {
            match reply {
                Some(reply) => reply.into_result(),
                None => Err(HttpError::Transport("no scripted reply".to_string())),
            }
        })
    }
}
