//! Transport module - the network capability the binding layer delegates to.
//!
//! A [`Transport`] turns a [`Request`] into a [`RawCall`]; executing the call
//! yields a [`RawResponse`] or a transport error. The binding layer imposes no
//! timeout or retry of its own.
//!
//! - [`ReqwestTransport`] - default implementation on top of `reqwest`
//! - [`MockTransport`] - queued in-memory replies for tests

mod mock;
mod reqwest_transport;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::http::{RawResponse, Request};

pub use mock::MockTransport;
pub use reqwest_transport::{
    ReqwestTransport, TransportConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Factory for pending network calls.
pub trait Transport: Send + Sync + 'static {
    /// Prepare a call; nothing is sent until it is executed.
    fn new_call(&self, request: Request) -> Box<dyn RawCall>;
}

/// One pending exchange with the server.
pub trait RawCall: Send {
    /// The request this call will send.
    fn request(&self) -> &Request;

    /// Send the request and buffer the response.
    fn execute(self: Box<Self>) -> BoxFuture<'static, Result<RawResponse>>;
}
