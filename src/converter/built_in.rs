//! Built-in converters - raw passthrough for bytes, prepared bodies and `()`.
//!
//! Always registered first so raw types never reach a codec.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;

use super::{
    ConverterFactory, Converters, RequestBodyConverter, ResponseBodyConverter, StringConverter,
};
use crate::error::{JianjiaError, Result};
use crate::http::{RequestBody, ResponseBody, OCTET_STREAM};
use crate::lookup::Lookup;
use crate::types::{Arg, Tags, TypeInfo};

/// Passthrough converters for `Bytes`, [`RequestBody`] and `()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltInConverters;

impl ConverterFactory for BuiltInConverters {
    fn name(&self) -> &str {
        "BuiltInConverters"
    }

    fn response_body_converter(
        &self,
        ty: &TypeInfo,
        _tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
        if ty.is::<Bytes>() {
            return Ok(Lookup::Found(Arc::new(BytesResponseConverter)));
        }
        if ty.is::<()>() {
            return Ok(Lookup::Found(Arc::new(UnitResponseConverter)));
        }
        Ok(Lookup::Declined)
    }

    fn request_body_converter(
        &self,
        ty: &TypeInfo,
        _param_tags: &Tags,
        _method_tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn RequestBodyConverter>>> {
        if ty.is::<RequestBody>() {
            return Ok(Lookup::Found(Arc::new(RequestBodyPassthrough)));
        }
        if ty.is::<Bytes>() {
            return Ok(Lookup::Found(Arc::new(BytesRequestConverter)));
        }
        Ok(Lookup::Declined)
    }
}

/// Zero-copy: hands the buffered body bytes out as-is.
struct BytesResponseConverter;

impl ResponseBodyConverter for BytesResponseConverter {
    fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>> {
        Ok(Box::new(body.into_bytes()))
    }
}

struct UnitResponseConverter;

impl ResponseBodyConverter for UnitResponseConverter {
    fn convert(&self, _body: ResponseBody) -> Result<Box<dyn Any + Send>> {
        Ok(Box::new(()))
    }
}

struct RequestBodyPassthrough;

impl RequestBodyConverter for RequestBodyPassthrough {
    fn convert(&self, value: &Arg) -> Result<RequestBody> {
        value
            .downcast_ref::<RequestBody>()
            .cloned()
            .ok_or_else(|| unexpected(value, "RequestBody"))
    }
}

struct BytesRequestConverter;

impl RequestBodyConverter for BytesRequestConverter {
    fn convert(&self, value: &Arg) -> Result<RequestBody> {
        // Bytes clones share the buffer.
        value
            .downcast_ref::<Bytes>()
            .map(|bytes| RequestBody::new(Some(OCTET_STREAM), bytes.clone()))
            .ok_or_else(|| unexpected(value, "Bytes"))
    }
}

fn unexpected(value: &Arg, expected: &str) -> JianjiaError {
    JianjiaError::Conversion(format!(
        "expected {} argument, got {}",
        expected,
        value.type_info()
    ))
}

/// Fallback string rendering: strings verbatim, scalars via `Display`,
/// anything else as compact JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToStringConverter;

impl StringConverter for ToStringConverter {
    fn convert(&self, value: &serde_json::Value) -> Result<String> {
        Ok(match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })
    }
}
