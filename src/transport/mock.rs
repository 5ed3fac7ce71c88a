//! In-memory transport for tests.
//!
//! Replies are served in the order they were queued; every executed request
//! is recorded.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.enqueue_response(200, r#"{"ok":true}"#);
//!
//! let client = Client::builder()
//!     .base_url("http://x/")?
//!     .transport(transport.clone())
//!     .build()?;
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::Mutex;

use super::{RawCall, Transport};
use crate::error::{JianjiaError, Result};
use crate::http::{RawResponse, Request, ResponseBody, ResponseHead};

enum Reply {
    Response(RawResponse),
    Failure(String),
}

#[derive(Default)]
struct MockState {
    replies: VecDeque<Reply>,
    requests: Vec<Request>,
}

/// Transport that answers from a queue instead of the network.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full response.
    pub fn enqueue(&self, response: RawResponse) {
        self.state.lock().replies.push_back(Reply::Response(response));
    }

    /// Queue a response with a status and body; JSON-looking bodies get a
    /// JSON content type.
    pub fn enqueue_response(&self, status: u16, body: impl Into<Bytes>) {
        let body = body.into();
        let content_type = match body.first() {
            Some(b'{') | Some(b'[') => "application/json",
            _ => "text/plain",
        };
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.enqueue(RawResponse::new(
            ResponseHead::new(status, headers, None),
            ResponseBody::new(Some(content_type), body),
        ));
    }

    /// Queue a transport failure.
    pub fn enqueue_failure(&self, message: &str) {
        self.state
            .lock()
            .replies
            .push_back(Reply::Failure(message.to_string()));
    }

    /// Requests executed so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }
}

impl Transport for MockTransport {
    fn new_call(&self, request: Request) -> Box<dyn RawCall> {
        Box::new(MockCall {
            state: self.state.clone(),
            request,
        })
    }
}

struct MockCall {
    state: Arc<Mutex<MockState>>,
    request: Request,
}

impl RawCall for MockCall {
    fn request(&self) -> &Request {
        &self.request
    }

    fn execute(self: Box<Self>) -> BoxFuture<'static, Result<RawResponse>> {
        let reply = {
            let mut state = self.state.lock();
            state.requests.push(self.request.clone());
            state.replies.pop_front()
        };
        Box::pin(async move {
            match reply {
                Some(Reply::Response(response)) => Ok(response),
                Some(Reply::Failure(message)) => Err(JianjiaError::transport(message)),
                None => Err(JianjiaError::transport("no response queued")),
            }
        })
    }
}
