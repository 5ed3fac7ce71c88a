//! Method module - parsed method declarations and request building.
//!
//! - [`parser`] validates a [`MethodSpec`](crate::service::MethodSpec) once and
//!   resolves its converters and call adapter into a [`MethodDescriptor`]
//! - [`request`] turns a descriptor plus runtime arguments into a
//!   [`Request`](crate::http::Request)

mod parser;
mod path;
mod request;

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Method};

use crate::adapter::{CallAdapter, ReturnType};
use crate::converter::ResponseBodyConverter;
use crate::types::{Tags, TypeInfo};

pub(crate) use parser::parse;
pub(crate) use request::ParameterHandler;

/// One parameter slot: declared type plus how its value is applied.
pub(crate) struct ParamSlot {
    pub(crate) ty: TypeInfo,
    pub(crate) handler: ParameterHandler,
}

/// Immutable, validated form of one service method.
///
/// Built at most once per method and shared by every invocation.
pub struct MethodDescriptor {
    service: String,
    name: String,
    method: Method,
    relative_url: Option<String>,
    headers: HeaderMap,
    content_type: Option<String>,
    has_body: bool,
    is_form_encoded: bool,
    is_multipart: bool,
    slots: Vec<ParamSlot>,
    tags: Tags,
    return_type: ReturnType,
    response_converter: Arc<dyn ResponseBodyConverter>,
    call_adapter: Arc<dyn CallAdapter>,
}

impl MethodDescriptor {
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template relative to the base URL; `None` when a `Url`
    /// parameter supplies it.
    pub fn relative_url(&self) -> Option<&str> {
        self.relative_url.as_deref()
    }

    /// Static headers, without `Content-Type`.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[inline]
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    #[inline]
    pub fn is_form_encoded(&self) -> bool {
        self.is_form_encoded
    }

    #[inline]
    pub fn is_multipart(&self) -> bool {
        self.is_multipart
    }

    pub fn param_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    #[inline]
    pub fn return_type(&self) -> &ReturnType {
        &self.return_type
    }

    /// Body type the response converter produces.
    pub fn response_type(&self) -> TypeInfo {
        self.call_adapter.response_type()
    }

    pub(crate) fn response_converter(&self) -> &Arc<dyn ResponseBodyConverter> {
        &self.response_converter
    }

    pub(crate) fn call_adapter(&self) -> &Arc<dyn CallAdapter> {
        &self.call_adapter
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("method", &format_args!("{}.{}", self.service, self.name))
            .field("verb", &self.method)
            .field("relative_url", &self.relative_url)
            .field("params", &self.slots.len())
            .field("returns", &self.return_type.full())
            .finish()
    }
}
