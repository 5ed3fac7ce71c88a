//! Outgoing request values.

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use super::TEXT_PLAIN_UTF8;
use crate::types::Tags;

/// A wire body with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<String>,
    bytes: Bytes,
}

impl RequestBody {
    pub fn new(content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// UTF-8 text body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Some(TEXT_PLAIN_UTF8), text.into())
    }

    /// Zero-length body without media type.
    pub fn empty() -> Self {
        Self::new(None, Bytes::new())
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[inline]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn with_content_type(mut self, content_type: Option<String>) -> Self {
        if content_type.is_some() {
            self.content_type = content_type;
        }
        self
    }
}

/// A fully materialized request, ready for a transport.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
    tags: Tags,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            tags: Tags::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    /// Method-level tags, available to transports and interceptors.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}
