//! Incoming response values.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::error::{JianjiaError, Result};

/// A buffered response body with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    content_type: Option<String>,
    bytes: Bytes,
}

impl ResponseBody {
    pub fn new(content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

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

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| JianjiaError::Conversion(format!("body is not UTF-8: {}", e)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Status line and headers of a response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
    url: Option<Url>,
}

impl ResponseHead {
    pub fn new(status: StatusCode, headers: HeaderMap, url: Option<Url>) -> Self {
        Self {
            status,
            headers,
            url,
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Canonical reason phrase for the status, or empty.
    pub fn message(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// URL the response came from; `None` for synthetic responses.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// 2xx status.
    #[inline]
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }
}

/// What a transport hands back: head plus unconverted body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    head: ResponseHead,
    body: ResponseBody,
}

impl RawResponse {
    pub fn new(head: ResponseHead, body: ResponseBody) -> Self {
        Self { head, body }
    }

    #[inline]
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    #[inline]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_parts(self) -> (ResponseHead, ResponseBody) {
        (self.head, self.body)
    }
}

/// A response whose body went through the response converter.
///
/// Successful responses carry `body` (absent for 204/205); unsuccessful ones
/// carry the raw `error_body` instead.
#[derive(Debug)]
pub struct Response<T> {
    head: ResponseHead,
    body: Option<T>,
    error_body: Option<ResponseBody>,
}

impl<T> Response<T> {
    /// Synthetic `200 OK` response.
    pub fn success(body: T) -> Self {
        Self::success_with_headers(body, HeaderMap::new())
    }

    /// Synthetic `200 OK` response with headers.
    pub fn success_with_headers(body: T, headers: HeaderMap) -> Self {
        Self {
            head: ResponseHead::new(StatusCode::OK, headers, None),
            body: Some(body),
            error_body: None,
        }
    }

    /// Success from an existing head, which must be 2xx.
    pub fn success_with(body: T, head: ResponseHead) -> Result<Self> {
        if !head.is_successful() {
            return Err(JianjiaError::Argument(
                "head must be a successful response".to_string(),
            ));
        }
        Ok(Self::from_parts(head, Some(body), None))
    }

    /// Synthetic error response; `code` must be at least 400.
    pub fn error(code: u16, body: ResponseBody) -> Result<Self> {
        if code < 400 {
            return Err(JianjiaError::Argument(format!("code < 400: {}", code)));
        }
        let status = StatusCode::from_u16(code)
            .map_err(|e| JianjiaError::Argument(format!("invalid status {}: {}", code, e)))?;
        Ok(Self::from_parts(
            ResponseHead::new(status, HeaderMap::new(), None),
            None,
            Some(body),
        ))
    }

    /// Error from an existing head, which must not be 2xx.
    pub fn error_with(body: ResponseBody, head: ResponseHead) -> Result<Self> {
        if head.is_successful() {
            return Err(JianjiaError::Argument(
                "head should not be a successful response".to_string(),
            ));
        }
        Ok(Self::from_parts(head, None, Some(body)))
    }

    pub(crate) fn from_parts(
        head: ResponseHead,
        body: Option<T>,
        error_body: Option<ResponseBody>,
    ) -> Self {
        Self {
            head,
            body,
            error_body,
        }
    }

    #[inline]
    pub fn head(&self) -> &ResponseHead {
        &self.head
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.head.code()
    }

    #[inline]
    pub fn is_successful(&self) -> bool {
        self.head.is_successful()
    }

    pub fn message(&self) -> &'static str {
        self.head.message()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    #[inline]
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    #[inline]
    pub fn error_body(&self) -> Option<&ResponseBody> {
        self.error_body.as_ref()
    }

    /// Convert the body, keeping head and error body.
    pub fn map_body<U, F>(self, f: F) -> Result<Response<U>>
    where
        F: FnOnce(T) -> Result<U>,
    {
        let body = self.body.map(f).transpose()?;
        Ok(Response {
            head: self.head,
            body,
            error_body: self.error_body,
        })
    }
}
