//! MessagePack converters using `rmp-serde`.
//!
//! **Always** encode with `to_vec_named`: structs must go over the wire as
//! maps keyed by field name, not positional arrays, or non-Rust peers cannot
//! read them.
//!
//! # Example
//!
//! ```
//! use jianjia::converter::MsgPackCodec;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     id: u32,
//!     content: String,
//! }
//!
//! let msg = Message { id: 42, content: "hello".to_string() };
//! let encoded = MsgPackCodec::encode(&msg).unwrap();
//! let decoded: Message = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

use std::any::Any;
use std::sync::Arc;

use super::{ConverterFactory, Converters, RequestBodyConverter, ResponseBodyConverter};
use crate::error::Result;
use crate::http::{RequestBody, ResponseBody};
use crate::lookup::Lookup;
use crate::types::{Arg, Tags, TypeInfo};

/// Media type of MessagePack request bodies.
pub const MSGPACK_MEDIA_TYPE: &str = "application/msgpack";

/// Codec name matched against the `codec` tag.
const CODEC: &str = "msgpack";

/// MessagePack encode/decode helpers.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value with struct-as-map layout.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// Encodes request bodies and decodes response bodies as MessagePack.
///
/// Values pass through a JSON tree on both sides, so binary MessagePack
/// payloads are not representable in response types.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackConverterFactory;

impl MsgPackConverterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ConverterFactory for MsgPackConverterFactory {
    fn name(&self) -> &str {
        "MsgPackConverterFactory"
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
        Ok(Lookup::Found(Arc::new(MsgPackResponseBodyConverter {
            ty: *ty,
        })))
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
        Ok(Lookup::Found(Arc::new(MsgPackRequestBodyConverter)))
    }
}

struct MsgPackRequestBodyConverter;

impl RequestBodyConverter for MsgPackRequestBodyConverter {
    fn convert(&self, value: &Arg) -> Result<RequestBody> {
        let tree = value.to_json()?;
        Ok(RequestBody::new(
            Some(MSGPACK_MEDIA_TYPE),
            MsgPackCodec::encode(&tree)?,
        ))
    }
}

struct MsgPackResponseBodyConverter {
    ty: TypeInfo,
}

impl ResponseBodyConverter for MsgPackResponseBodyConverter {
    fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>> {
        let tree: serde_json::Value = MsgPackCodec::decode(body.bytes())?;
        self.ty.decode_json(tree)
    }
}
