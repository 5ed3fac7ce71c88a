//! Transport-level request and response values.
//!
//! - [`Request`] / [`RequestBody`] - what the request factory produces
//! - [`RawResponse`] / [`ResponseBody`] - what a transport returns
//! - [`Response`] - status and headers plus the converted body
//!
//! Method, header and status types come from the `http` crate.

mod request;
mod response;

pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
pub use request::{Request, RequestBody};
pub use response::{RawResponse, Response, ResponseBody, ResponseHead};

/// `Content-Type` used by text bodies.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=UTF-8";

/// `Content-Type` used by form-encoded bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `Content-Type` used when a body carries no explicit media type.
pub const OCTET_STREAM: &str = "application/octet-stream";
