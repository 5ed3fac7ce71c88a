//! Converter module - values to wire bodies and back.
//!
//! The [`Converters`] registry holds an ordered list of [`ConverterFactory`]
//! implementations. Each query walks the list and returns the first factory
//! that answers [`Lookup::Found`]. A factory can delegate to the factories
//! registered after it through the `next_*` queries.
//!
//! Shipped factories:
//!
//! - [`BuiltInConverters`] - `Bytes`, [`RequestBody`] and `()` passthrough (always first)
//! - [`ScalarsConverterFactory`] - strings, booleans and numbers as `text/plain`
//! - [`JsonConverterFactory`] - JSON via `serde_json`
//! - [`MsgPackConverterFactory`] - MessagePack via `rmp-serde`
//!
//! # Example
//!
//! ```ignore
//! use jianjia::converter::{Converters, JsonConverterFactory};
//! use jianjia::types::{Tags, TypeInfo};
//! use std::sync::Arc;
//!
//! let converters = Converters::new(vec![Arc::new(JsonConverterFactory::new())]);
//! let user = TypeInfo::deserializable::<User>();
//! let converter = converters.response_body_converter(&user, &Tags::new())?;
//! ```

mod built_in;
mod json;
mod msgpack;
mod scalars;

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::http::{RequestBody, ResponseBody};
use crate::lookup::{not_located, start_after, Lookup};
use crate::types::{Arg, Tags, TypeInfo};

pub use built_in::{BuiltInConverters, ToStringConverter};
pub use json::{JsonConverterFactory, JSON_MEDIA_TYPE};
pub use msgpack::{MsgPackCodec, MsgPackConverterFactory, MSGPACK_MEDIA_TYPE};
pub use scalars::ScalarsConverterFactory;

/// Turns an argument's JSON form into a URL, header or form value.
pub trait StringConverter: Send + Sync {
    fn convert(&self, value: &serde_json::Value) -> Result<String>;
}

/// Turns an argument into a request body.
pub trait RequestBodyConverter: Send + Sync {
    fn convert(&self, value: &Arg) -> Result<RequestBody>;
}

/// Turns a response body into a value of the declared type.
pub trait ResponseBodyConverter: Send + Sync {
    fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>>;
}

/// Produces converters for the types it understands.
///
/// Every query defaults to [`Lookup::Declined`].
pub trait ConverterFactory: Send + Sync {
    /// Name shown in resolution diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn response_body_converter(
        &self,
        _ty: &TypeInfo,
        _tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
        Ok(Lookup::Declined)
    }

    fn request_body_converter(
        &self,
        _ty: &TypeInfo,
        _param_tags: &Tags,
        _method_tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn RequestBodyConverter>>> {
        Ok(Lookup::Declined)
    }

    fn string_converter(
        &self,
        _ty: &TypeInfo,
        _tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn StringConverter>>> {
        Ok(Lookup::Declined)
    }
}

/// Ordered converter factory chain.
#[derive(Clone, Default)]
pub struct Converters {
    factories: Vec<Arc<dyn ConverterFactory>>,
}

impl Converters {
    pub fn new(factories: Vec<Arc<dyn ConverterFactory>>) -> Self {
        Self { factories }
    }

    pub fn factories(&self) -> &[Arc<dyn ConverterFactory>] {
        &self.factories
    }

    /// Converter for a parameter rendered into the URL, a header or a form field.
    ///
    /// Falls back to [`ToStringConverter`] when no factory answers.
    pub fn string_converter(&self, ty: &TypeInfo, tags: &Tags) -> Result<Arc<dyn StringConverter>> {
        for factory in &self.factories {
            if let Lookup::Found(converter) = factory.string_converter(ty, tags, self)? {
                return Ok(converter);
            }
        }
        Ok(Arc::new(ToStringConverter))
    }

    pub fn request_body_converter(
        &self,
        ty: &TypeInfo,
        param_tags: &Tags,
        method_tags: &Tags,
    ) -> Result<Arc<dyn RequestBodyConverter>> {
        self.next_request_body_converter(None, ty, param_tags, method_tags)
    }

    /// Like [`request_body_converter`](Self::request_body_converter), starting after `skip_past`.
    pub fn next_request_body_converter(
        &self,
        skip_past: Option<&dyn ConverterFactory>,
        ty: &TypeInfo,
        param_tags: &Tags,
        method_tags: &Tags,
    ) -> Result<Arc<dyn RequestBodyConverter>> {
        let start = start_after(&self.factories, skip_past);
        for factory in &self.factories[start..] {
            if let Lookup::Found(converter) =
                factory.request_body_converter(ty, param_tags, method_tags, self)?
            {
                return Ok(converter);
            }
        }
        Err(self.not_located("RequestBody converter", ty, start, skip_past.is_some()))
    }

    pub fn response_body_converter(
        &self,
        ty: &TypeInfo,
        tags: &Tags,
    ) -> Result<Arc<dyn ResponseBodyConverter>> {
        self.next_response_body_converter(None, ty, tags)
    }

    /// Like [`response_body_converter`](Self::response_body_converter), starting after `skip_past`.
    pub fn next_response_body_converter(
        &self,
        skip_past: Option<&dyn ConverterFactory>,
        ty: &TypeInfo,
        tags: &Tags,
    ) -> Result<Arc<dyn ResponseBodyConverter>> {
        let start = start_after(&self.factories, skip_past);
        for factory in &self.factories[start..] {
            if let Lookup::Found(converter) = factory.response_body_converter(ty, tags, self)? {
                return Ok(converter);
            }
        }
        Err(self.not_located("ResponseBody converter", ty, start, skip_past.is_some()))
    }

    fn not_located(
        &self,
        what: &str,
        ty: &TypeInfo,
        start: usize,
        skipped: bool,
    ) -> crate::error::JianjiaError {
        let names: Vec<&str> = self.factories.iter().map(|f| f.name()).collect();
        not_located(what, ty.name(), &names, start, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Answers response queries with a fixed marker, or declines.
    struct Fixed {
        name: &'static str,
        matches: bool,
    }

    struct Marker(&'static str);

    impl ResponseBodyConverter for Marker {
        fn convert(&self, _body: ResponseBody) -> Result<Box<dyn Any + Send>> {
            Ok(Box::new(self.0))
        }
    }

    impl ConverterFactory for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn response_body_converter(
            &self,
            _ty: &TypeInfo,
            _tags: &Tags,
            _converters: &Converters,
        ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
            if self.matches {
                Ok(Lookup::Found(Arc::new(Marker(self.name))))
            } else {
                Ok(Lookup::Declined)
            }
        }
    }

    fn fixed(name: &'static str, matches: bool) -> Arc<dyn ConverterFactory> {
        Arc::new(Fixed { name, matches })
    }

    fn marker_of(converter: Arc<dyn ResponseBodyConverter>) -> &'static str {
        *converter
            .convert(ResponseBody::empty())
            .unwrap()
            .downcast::<&'static str>()
            .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let converters =
            Converters::new(vec![fixed("A", false), fixed("B", true), fixed("C", true)]);
        let ty = TypeInfo::of::<String>();

        let found = converters.response_body_converter(&ty, &Tags::new()).unwrap();
        assert_eq!(marker_of(found), "B");
    }

    #[test]
    fn test_next_after_skip_past() {
        let converters =
            Converters::new(vec![fixed("A", false), fixed("B", true), fixed("C", true)]);
        let ty = TypeInfo::of::<String>();
        let b = converters.factories()[1].clone();

        let next = converters
            .next_response_body_converter(Some(b.as_ref()), &ty, &Tags::new())
            .unwrap();
        assert_eq!(marker_of(next), "C");
    }

    #[test]
    fn test_next_after_skip_past_fails_with_diagnostic() {
        let converters =
            Converters::new(vec![fixed("A", false), fixed("B", true), fixed("C", false)]);
        let ty = TypeInfo::of::<String>();
        let b = converters.factories()[1].clone();

        let err = converters
            .next_response_body_converter(Some(b.as_ref()), &ty, &Tags::new())
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            concat!(
                "Could not locate ResponseBody converter for alloc::string::String.\n",
                "  Skipped:\n   * A\n   * B\n",
                "  Tried:\n   * C"
            )
        );
    }

    #[test]
    fn test_no_match_lists_all_tried() {
        let converters = Converters::new(vec![fixed("A", false), fixed("B", false)]);
        let err = converters
            .request_body_converter(&TypeInfo::of::<u8>(), &Tags::new(), &Tags::new())
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Could not locate RequestBody converter for u8.\n  Tried:\n   * A\n   * B"
        );
    }

    #[test]
    fn test_string_converter_falls_back_to_to_string() {
        let converters = Converters::new(vec![fixed("A", false)]);
        let converter = converters
            .string_converter(&TypeInfo::of::<u32>(), &Tags::new())
            .unwrap();
        assert_eq!(converter.convert(&serde_json::json!(42)).unwrap(), "42");
    }

    #[test]
    fn test_factory_delegates_to_next() {
        /// Records that it ran, then hands over to the rest of the chain.
        struct Delegating(AtomicBool);

        impl ConverterFactory for Delegating {
            fn response_body_converter(
                &self,
                ty: &TypeInfo,
                tags: &Tags,
                converters: &Converters,
            ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
                self.0.store(true, Ordering::SeqCst);
                converters
                    .next_response_body_converter(Some(self as &dyn ConverterFactory), ty, tags)
                    .map(Lookup::Found)
            }
        }

        let delegating = Arc::new(Delegating(AtomicBool::new(false)));
        let converters = Converters::new(vec![
            delegating.clone() as Arc<dyn ConverterFactory>,
            fixed("B", true),
        ]);
        let found = converters
            .response_body_converter(&TypeInfo::of::<String>(), &Tags::new())
            .unwrap();
        assert!(delegating.0.load(Ordering::SeqCst));
        assert_eq!(marker_of(found), "B");
    }
}
