//! JSON converters using `serde_json`.

use std::any::Any;
use std::sync::Arc;

use super::{ConverterFactory, Converters, RequestBodyConverter, ResponseBodyConverter};
use crate::error::Result;
use crate::http::{RequestBody, ResponseBody};
use crate::lookup::Lookup;
use crate::types::{Arg, Tags, TypeInfo};

/// Media type of JSON request bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json; charset=UTF-8";

/// Codec name matched against the `codec` tag.
const CODEC: &str = "json";

/// Encodes request bodies and decodes response bodies as JSON.
///
/// Response types must be declared with a decode hook
/// (see [`TypeInfo::deserializable`]); other types are declined.
#[derive(Debug, Default, Clone)]
pub struct JsonConverterFactory {
    pretty: bool,
}

impl JsonConverterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent request bodies.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl ConverterFactory for JsonConverterFactory {
    fn name(&self) -> &str {
        "JsonConverterFactory"
    }

    fn response_body_converter(
        &self,
        ty: &TypeInfo,
        tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
        if !tags.allows_codec(CODEC) || !ty.is_decodable() {
            return Ok(Lookup::Declined);
        }
        Ok(Lookup::Found(Arc::new(JsonResponseBodyConverter { ty: *ty })))
    }

    fn request_body_converter(
        &self,
        _ty: &TypeInfo,
        param_tags: &Tags,
        method_tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn RequestBodyConverter>>> {
        if !param_tags.allows_codec(CODEC) || !method_tags.allows_codec(CODEC) {
            return Ok(Lookup::Declined);
        }
        Ok(Lookup::Found(Arc::new(JsonRequestBodyConverter {
            pretty: self.pretty,
        })))
    }
}

struct JsonRequestBodyConverter {
    pretty: bool,
}

impl RequestBodyConverter for JsonRequestBodyConverter {
    fn convert(&self, value: &Arg) -> Result<RequestBody> {
        let tree = value.to_json()?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&tree)?
        } else {
            serde_json::to_vec(&tree)?
        };
        Ok(RequestBody::new(Some(JSON_MEDIA_TYPE), bytes))
    }
}

struct JsonResponseBodyConverter {
    ty: TypeInfo,
}

impl ResponseBodyConverter for JsonResponseBodyConverter {
    fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>> {
        // from_slice rejects trailing content after the document.
        let tree: serde_json::Value = serde_json::from_slice(body.bytes())?;
        self.ty.decode_json(tree)
    }
}
