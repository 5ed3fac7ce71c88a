//! Scalar converters: strings, booleans, chars and numbers as plain text.

use std::any::Any;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use super::{
    ConverterFactory, Converters, RequestBodyConverter, ResponseBodyConverter, StringConverter,
    ToStringConverter,
};
use crate::error::{JianjiaError, Result};
use crate::http::{RequestBody, ResponseBody};
use crate::lookup::Lookup;
use crate::types::{Arg, Tags, TypeInfo};

type ParseFn = fn(&str) -> Result<Box<dyn Any + Send>>;

macro_rules! scalar_parser {
    ($ty:expr; $($t:ty),* $(,)?) => {{
        $(
            if $ty.is::<$t>() {
                return Some(parse_scalar::<$t> as ParseFn);
            }
        )*
        None
    }};
}

fn parser_for(ty: &TypeInfo) -> Option<ParseFn> {
    scalar_parser!(ty;
        String, bool, char,
        i8, i16, i32, i64, i128, isize,
        u8, u16, u32, u64, u128, usize,
        f32, f64,
    )
}

fn parse_scalar<T>(text: &str) -> Result<Box<dyn Any + Send>>
where
    T: FromStr + Send + 'static,
    T::Err: Display,
{
    text.parse::<T>()
        .map(|v| Box::new(v) as Box<dyn Any + Send>)
        .map_err(|e| {
            JianjiaError::Conversion(format!(
                "cannot parse {:?} as {}: {}",
                text,
                std::any::type_name::<T>(),
                e
            ))
        })
}

/// `text/plain` bodies for scalar types.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarsConverterFactory;

impl ScalarsConverterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ConverterFactory for ScalarsConverterFactory {
    fn name(&self) -> &str {
        "ScalarsConverterFactory"
    }

    fn response_body_converter(
        &self,
        ty: &TypeInfo,
        _tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn ResponseBodyConverter>>> {
        Ok(match parser_for(ty) {
            Some(parse) => Lookup::Found(Arc::new(ScalarResponseBodyConverter { parse })),
            None => Lookup::Declined,
        })
    }

    fn request_body_converter(
        &self,
        ty: &TypeInfo,
        _param_tags: &Tags,
        _method_tags: &Tags,
        _converters: &Converters,
    ) -> Result<Lookup<Arc<dyn RequestBodyConverter>>> {
        if parser_for(ty).is_none() {
            return Ok(Lookup::Declined);
        }
        Ok(Lookup::Found(Arc::new(ScalarRequestBodyConverter)))
    }
}

struct ScalarRequestBodyConverter;

impl RequestBodyConverter for ScalarRequestBodyConverter {
    fn convert(&self, value: &Arg) -> Result<RequestBody> {
        let text = ToStringConverter.convert(&value.to_json()?)?;
        Ok(RequestBody::text(text))
    }
}

struct ScalarResponseBodyConverter {
    parse: ParseFn,
}

impl ResponseBodyConverter for ScalarResponseBodyConverter {
    fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>> {
        (self.parse)(body.text()?)
    }
}
