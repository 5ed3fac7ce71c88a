//! Declarative service surface.
//!
//! A service is an explicit table of methods. Each [`MethodSpec`] names an
//! HTTP verb and path template, lists its parameters in call order with their
//! roles, and declares the return shape the caller will request.
//!
//! # Example
//!
//! ```ignore
//! use jianjia::{Call, MethodSpec, ParamSpec, ServiceSpec};
//!
//! let spec = ServiceSpec::new("GitHub")
//!     .method(
//!         MethodSpec::get("contributors", "repos/{owner}/{repo}/contributors")
//!             .param(ParamSpec::path::<String>("owner"))
//!             .param(ParamSpec::path::<String>("repo"))
//!             .param(ParamSpec::query::<u32>("per_page"))
//!             .returns::<Call<Vec<Contributor>>>(),
//!     );
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::adapter::{ReturnType, ReturnValue};
use crate::types::{Tags, TypeInfo};

/// Default `Content-Transfer-Encoding` of multipart parts.
pub const DEFAULT_PART_ENCODING: &str = "binary";

/// Body encoding selected at method level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `application/x-www-form-urlencoded`, built from `Field` parameters.
    FormUrlEncoded,
    /// `multipart/form-data`, built from `Part` parameters.
    Multipart,
}

/// How one parameter contributes to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamRole {
    /// Replaces the whole relative URL.
    Url,
    /// Substitutes the `{name}` placeholder of the path template.
    Path { name: String, encoded: bool },
    /// `name=value` query pair; collections repeat the pair.
    Query { name: String, encoded: bool },
    /// Bare query name without a value.
    QueryName { encoded: bool },
    /// Query pairs from the entries of a map.
    QueryMap { encoded: bool },
    /// Request header.
    Header { name: String },
    /// Request headers from the entries of a map.
    HeaderMap,
    /// Form field of a form-encoded body.
    Field { name: String, encoded: bool },
    /// Form fields from the entries of a map.
    FieldMap { encoded: bool },
    /// Part of a multipart body, converted by the request body converter.
    Part { name: String, encoding: String },
    /// Text parts from the entries of a map.
    PartMap { encoding: String },
    /// The request body, converted by the request body converter.
    Body,
}

impl ParamRole {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ParamRole::Url => "@Url",
            ParamRole::Path { .. } => "@Path",
            ParamRole::Query { .. } => "@Query",
            ParamRole::QueryName { .. } => "@QueryName",
            ParamRole::QueryMap { .. } => "@QueryMap",
            ParamRole::Header { .. } => "@Header",
            ParamRole::HeaderMap => "@HeaderMap",
            ParamRole::Field { .. } => "@Field",
            ParamRole::FieldMap { .. } => "@FieldMap",
            ParamRole::Part { .. } => "@Part",
            ParamRole::PartMap { .. } => "@PartMap",
            ParamRole::Body => "@Body",
        }
    }
}

/// One declared parameter: role, declared type and metadata tags.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    role: ParamRole,
    ty: TypeInfo,
    tags: Tags,
}

impl ParamSpec {
    pub fn new(role: ParamRole, ty: TypeInfo) -> Self {
        Self {
            role,
            ty,
            tags: Tags::new(),
        }
    }

    fn typed<T: 'static>(role: ParamRole) -> Self {
        Self::new(role, TypeInfo::of::<T>())
    }

    pub fn url<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::Url)
    }

    pub fn path<T: 'static>(name: &str) -> Self {
        Self::typed::<T>(ParamRole::Path {
            name: name.to_string(),
            encoded: false,
        })
    }

    pub fn query<T: 'static>(name: &str) -> Self {
        Self::typed::<T>(ParamRole::Query {
            name: name.to_string(),
            encoded: false,
        })
    }

    pub fn query_name<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::QueryName { encoded: false })
    }

    pub fn query_map<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::QueryMap { encoded: false })
    }

    pub fn header<T: 'static>(name: &str) -> Self {
        Self::typed::<T>(ParamRole::Header {
            name: name.to_string(),
        })
    }

    pub fn header_map<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::HeaderMap)
    }

    pub fn field<T: 'static>(name: &str) -> Self {
        Self::typed::<T>(ParamRole::Field {
            name: name.to_string(),
            encoded: false,
        })
    }

    pub fn field_map<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::FieldMap { encoded: false })
    }

    pub fn part<T: 'static>(name: &str) -> Self {
        Self::typed::<T>(ParamRole::Part {
            name: name.to_string(),
            encoding: DEFAULT_PART_ENCODING.to_string(),
        })
    }

    pub fn part_map<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::PartMap {
            encoding: DEFAULT_PART_ENCODING.to_string(),
        })
    }

    pub fn body<T: 'static>() -> Self {
        Self::typed::<T>(ParamRole::Body)
    }

    /// Mark the value as already URL-encoded. No effect on roles that are
    /// never URL-encoded.
    pub fn encoded(mut self) -> Self {
        match &mut self.role {
            ParamRole::Path { encoded, .. }
            | ParamRole::Query { encoded, .. }
            | ParamRole::QueryName { encoded }
            | ParamRole::QueryMap { encoded }
            | ParamRole::Field { encoded, .. }
            | ParamRole::FieldMap { encoded } => *encoded = true,
            _ => {}
        }
        self
    }

    /// `Content-Transfer-Encoding` of a part. No effect on other roles.
    pub fn transfer_encoding(mut self, value: &str) -> Self {
        if let ParamRole::Part { encoding, .. } | ParamRole::PartMap { encoding } = &mut self.role {
            *encoding = value.to_string();
        }
        self
    }

    /// Attach a metadata tag consulted by converter factories.
    pub fn tag(mut self, name: &str, value: &str) -> Self {
        self.tags.push(name, value);
        self
    }

    #[inline]
    pub fn role(&self) -> &ParamRole {
        &self.role
    }

    #[inline]
    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// One declared service method.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    verb: String,
    path: String,
    has_body: bool,
    headers: Vec<String>,
    encodings: Vec<Encoding>,
    params: Vec<ParamSpec>,
    tags: Tags,
    returns: Option<ReturnType>,
}

macro_rules! verb {
    ($(#[$doc:meta])* $fn_name:ident, $verb:literal, $has_body:literal) => {
        $(#[$doc])*
        pub fn $fn_name(name: &str, path: &str) -> Self {
            Self::http(name, $verb, path, $has_body)
        }
    };
}

impl MethodSpec {
    verb!(
        /// `GET`; an empty path requires a `Url` parameter.
        get, "GET", false
    );
    verb!(head, "HEAD", false);
    verb!(delete, "DELETE", false);
    verb!(options, "OPTIONS", false);
    verb!(post, "POST", true);
    verb!(put, "PUT", true);
    verb!(patch, "PATCH", true);

    /// Arbitrary verb.
    pub fn http(name: &str, verb: &str, path: &str, has_body: bool) -> Self {
        Self {
            name: name.to_string(),
            verb: verb.to_string(),
            path: path.to_string(),
            has_body,
            headers: Vec::new(),
            encodings: Vec::new(),
            params: Vec::new(),
            tags: Tags::new(),
            returns: None,
        }
    }

    /// Static header in `Name: Value` form.
    pub fn header(mut self, header: &str) -> Self {
        self.headers.push(header.to_string());
        self
    }

    pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = &'a str>) -> Self {
        self.headers.extend(headers.into_iter().map(str::to_string));
        self
    }

    pub fn form_url_encoded(mut self) -> Self {
        self.encodings.push(Encoding::FormUrlEncoded);
        self
    }

    pub fn multipart(mut self) -> Self {
        self.encodings.push(Encoding::Multipart);
        self
    }

    /// Append the next parameter, in call order.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a method-level metadata tag.
    pub fn tag(mut self, name: &str, value: &str) -> Self {
        self.tags.push(name, value);
        self
    }

    /// Declare the return shape, e.g. `returns::<Call<User>>()`.
    pub fn returns<R: ReturnValue>(self) -> Self {
        self.returns_type(R::return_type())
    }

    /// Declare a return shape described by hand.
    pub fn returns_type(mut self, return_type: ReturnType) -> Self {
        self.returns = Some(return_type);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    pub fn static_headers(&self) -> &[String] {
        &self.headers
    }

    pub fn encodings(&self) -> &[Encoding] {
        &self.encodings
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    #[inline]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn return_type(&self) -> Option<&ReturnType> {
        self.returns.as_ref()
    }
}

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

fn next_service_id() -> u64 {
    NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A named table of methods.
///
/// Clones share an identity, which keys the client's descriptor cache.
/// Adding a method yields a new identity.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    id: u64,
    name: String,
    methods: Vec<MethodSpec>,
}

impl ServiceSpec {
    pub fn new(name: &str) -> Self {
        Self {
            id: next_service_id(),
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.id = next_service_id();
        self.methods.push(method);
        self
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    pub fn find(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }
}
