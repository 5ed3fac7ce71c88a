//! Runtime type identity, metadata tags and erased call arguments.
//!
//! Converters and call adapters are chosen per declared type. Rust has no
//! runtime reflection, so declarations carry a [`TypeInfo`] captured where the
//! concrete type is still known, and invocation arguments travel as [`Arg`]s
//! that remember both their type and how to serialize themselves.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{JianjiaError, Result};

/// Tag name codec converter factories look at to decide whether they apply.
pub const CODEC_TAG: &str = "codec";

type DecodeFn = fn(serde_json::Value) -> Result<Box<dyn Any + Send>>;
type EncodeFn = fn(&(dyn Any + Send + Sync)) -> Result<serde_json::Value>;

/// Identity of a declared type, optionally able to build values from JSON trees.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    decode: Option<DecodeFn>,
}

impl TypeInfo {
    /// Identity only.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            decode: None,
        }
    }

    /// Identity plus a serde decode hook, used by structured codecs.
    pub fn deserializable<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            decode: Some(decode_json::<T>),
            ..Self::of::<T>()
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn is_decodable(&self) -> bool {
        self.decode.is_some()
    }

    /// Build a value of this type from a decoded JSON tree.
    pub fn decode_json(&self, value: serde_json::Value) -> Result<Box<dyn Any + Send>> {
        match self.decode {
            Some(decode) => decode(value),
            None => Err(JianjiaError::Conversion(format!(
                "{} cannot be decoded from a structured body",
                self.name
            ))),
        }
    }
}

fn decode_json<T: DeserializeOwned + Send + 'static>(
    value: serde_json::Value,
) -> Result<Box<dyn Any + Send>> {
    let decoded: T = serde_json::from_value(value)?;
    Ok(Box::new(decoded))
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A single `name = value` metadata entry attached to a method or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Ordered metadata consulted by converter and adapter factories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.0.push(Tag {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True unless a `codec` tag names a different codec.
    ///
    /// Codec factories use this to decline types routed to another codec.
    pub fn allows_codec(&self, codec: &str) -> bool {
        self.get(CODEC_TAG).map_or(true, |c| c.eq_ignore_ascii_case(codec))
    }
}

/// One runtime argument of an invocation.
///
/// An absent argument (built from `None`) plays the role of `null`: optional
/// roles skip it, required roles reject it.
pub struct Arg {
    ty: TypeInfo,
    value: Option<Box<dyn Any + Send + Sync>>,
    encode: Option<EncodeFn>,
}

impl Arg {
    /// A serializable argument.
    pub fn new<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            value: Some(Box::new(value)),
            encode: Some(encode_json::<T>),
        }
    }

    /// An optional argument; `None` is absent.
    pub fn opt<T: Serialize + Send + Sync + 'static>(value: Option<T>) -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            value: value.map(|v| Box::new(v) as Box<dyn Any + Send + Sync>),
            encode: Some(encode_json::<T>),
        }
    }

    /// An argument only converters that know the concrete type can use
    /// (for example a prepared [`RequestBody`](crate::http::RequestBody)).
    pub fn raw<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            value: Some(Box::new(value)),
            encode: None,
        }
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|v| v.downcast_ref::<T>())
    }

    /// Serialize to a JSON tree; absent arguments become `null`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let Some(value) = self.value.as_deref() else {
            return Ok(serde_json::Value::Null);
        };
        match self.encode {
            Some(encode) => encode(value),
            None => Err(JianjiaError::Conversion(format!(
                "{} is not serializable",
                self.ty.name
            ))),
        }
    }
}

fn encode_json<T: Serialize + 'static>(
    value: &(dyn Any + Send + Sync),
) -> Result<serde_json::Value> {
    let value = value.downcast_ref::<T>().ok_or_else(|| {
        JianjiaError::Conversion(format!("expected {}", std::any::type_name::<T>()))
    })?;
    Ok(serde_json::to_value(value)?)
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("type", &self.ty)
            .field("absent", &self.is_absent())
            .finish()
    }
}

/// Positional arguments for one invocation.
#[derive(Debug, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Serialize + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.0.push(Arg::new(value));
        self
    }

    pub fn with_opt<T: Serialize + Send + Sync + 'static>(mut self, value: Option<T>) -> Self {
        self.0.push(Arg::opt(value));
        self
    }

    pub fn with_raw<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.0.push(Arg::raw(value));
        self
    }

    pub fn push(&mut self, arg: Arg) {
        self.0.push(arg);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arg> {
        self.0.iter()
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}
