//! `reqwest`-backed transport.
//!
//! # Example
//!
//! ```ignore
//! use jianjia::transport::{ReqwestTransport, TransportConfig};
//! use std::time::Duration;
//!
//! let transport = ReqwestTransport::new(TransportConfig {
//!     timeout: Some(Duration::from_secs(30)),
//!     ..TransportConfig::default()
//! })?;
//! ```

use std::time::Duration;

use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;

use super::{RawCall, Transport};
use crate::error::{JianjiaError, Result};
use crate::http::{RawResponse, Request, ResponseBody, ResponseHead};

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("jianjia/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for establishing connections.
    pub connect_timeout: Option<Duration>,
    /// Timeout for a whole exchange. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Transport executing requests with a shared `reqwest::Client`.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client from the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(JianjiaError::transport)?;
        Ok(Self { client })
    }

    /// Reuse an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    /// [`TransportConfig::default()`], or a plain client if that fails to build.
    ///
    /// [`ClientBuilder::build`](crate::ClientBuilder::build) uses
    /// [`ReqwestTransport::new`] instead and reports the failure.
    fn default() -> Self {
        Self::new(TransportConfig::default()).unwrap_or_else(|e| {
            tracing::warn!("Falling back to a plain reqwest client: {}", e);
            Self::from_client(reqwest::Client::new())
        })
    }
}

impl Transport for ReqwestTransport {
    fn new_call(&self, request: Request) -> Box<dyn RawCall> {
        Box::new(ReqwestCall {
            client: self.client.clone(),
            request,
        })
    }
}

struct ReqwestCall {
    client: reqwest::Client,
    request: Request,
}

impl RawCall for ReqwestCall {
    fn request(&self) -> &Request {
        &self.request
    }

    fn execute(self: Box<Self>) -> BoxFuture<'static, Result<RawResponse>> {
        let ReqwestCall { client, request } = *self;
        Box::pin(async move {
            let mut builder = client
                .request(request.method().clone(), request.url().as_str())
                .headers(request.headers().clone());

            if let Some(body) = request.body() {
                if !request.headers().contains_key(CONTENT_TYPE) {
                    if let Some(content_type) = body.content_type() {
                        builder = builder.header(CONTENT_TYPE, content_type);
                    }
                }
                builder = builder.body(body.bytes().clone());
            }

            tracing::debug!("{} {}", request.method(), request.url());

            let response = builder.send().await.map_err(JianjiaError::transport)?;
            let status = response.status();
            let headers = response.headers().clone();
            let url = response.url().clone();
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await.map_err(JianjiaError::transport)?;

            Ok(RawResponse::new(
                ResponseHead::new(status, headers, Some(url)),
                ResponseBody::new(content_type.as_deref(), bytes),
            ))
        })
    }
}
