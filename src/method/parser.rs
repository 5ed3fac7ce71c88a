//! Method declaration validation.
//!
//! Rules are checked in declaration order and the first violation is
//! reported as [`JianjiaError::Method`] naming the service and method.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use super::path::{blocks, is_valid_name, placeholders};
use super::{MethodDescriptor, ParamSlot, ParameterHandler};
use crate::adapter::CallAdapters;
use crate::converter::Converters;
use crate::error::{JianjiaError, Result};
use crate::http::{RawResponse, ResponseHead};
use crate::service::{Encoding, MethodSpec, ParamRole, ParamSpec};

/// Validate `spec` and resolve everything it needs.
pub(crate) fn parse(
    service: &str,
    spec: &MethodSpec,
    converters: &Converters,
    adapters: &CallAdapters,
) -> Result<MethodDescriptor> {
    Parser {
        service,
        spec,
        converters,
    }
    .parse(adapters)
}

struct Parser<'a> {
    service: &'a str,
    spec: &'a MethodSpec,
    converters: &'a Converters,
}

/// Which parameter roles have been seen so far.
#[derive(Default)]
struct Seen {
    url: bool,
    path: bool,
    query: bool,
    query_name: bool,
    query_map: bool,
    field: bool,
    part: bool,
    body: bool,
    path_names: Vec<String>,
}

impl Seen {
    /// Label of a query role already seen, if any.
    fn query_role(&self) -> Option<&'static str> {
        if self.query {
            Some("@Query")
        } else if self.query_name {
            Some("@QueryName")
        } else if self.query_map {
            Some("@QueryMap")
        } else {
            None
        }
    }
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> JianjiaError {
        JianjiaError::method(self.service, self.spec.name(), reason)
    }

    fn param_error(&self, index: usize, reason: impl Into<String>) -> JianjiaError {
        self.error(format!("{} (parameter #{})", reason.into(), index + 1))
    }

    fn parse(self, adapters: &CallAdapters) -> Result<MethodDescriptor> {
        let spec = self.spec;

        let return_type = *spec
            .return_type()
            .ok_or_else(|| self.error("Service methods must declare a return type."))?;

        if spec.verb().is_empty() {
            return Err(self.error(
                "HTTP method annotation is required (e.g., @GET, @POST, etc.).",
            ));
        }
        let method = Method::from_bytes(spec.verb().as_bytes())
            .map_err(|_| self.error(format!("Invalid HTTP method \"{}\".", spec.verb())))?;

        let (is_form_encoded, is_multipart) = self.encoding()?;

        let relative_url = self.relative_url()?;
        let (headers, content_type) = self.static_headers()?;

        let call_adapter = adapters
            .call_adapter(&return_type, spec.tags())
            .map_err(|e| {
                self.error(format!(
                    "Unable to create call adapter for {}\n    {}",
                    return_type.full(),
                    e
                ))
            })?;
        let response_type = call_adapter.response_type();
        if response_type.is::<RawResponse>() || response_type.is::<ResponseHead>() {
            return Err(self.error(format!(
                "'{}' is not a valid response body type. Use Bytes or () instead.",
                response_type
            )));
        }
        if method == Method::HEAD && !response_type.is::<()>() {
            return Err(self.error("HEAD method must use () as response type."));
        }
        let response_converter = self
            .converters
            .response_body_converter(&response_type, spec.tags())
            .map_err(|e| {
                self.error(format!(
                    "Unable to create converter for {}\n    {}",
                    response_type, e
                ))
            })?;

        let mut seen = Seen::default();
        let mut slots = Vec::with_capacity(spec.params().len());
        for (index, param) in spec.params().iter().enumerate() {
            let handler = self.parameter(
                index,
                param,
                &mut seen,
                relative_url.as_deref(),
                is_form_encoded,
                is_multipart,
            )?;
            slots.push(ParamSlot {
                ty: param.type_info(),
                handler,
            });
        }

        if relative_url.is_none() && !seen.url {
            return Err(self.error(format!(
                "Missing either @{} URL or @Url parameter.",
                spec.verb()
            )));
        }
        if !is_form_encoded && !is_multipart && !spec.has_body() && seen.body {
            return Err(self.error("Non-body HTTP method cannot contain @Body."));
        }
        if is_form_encoded && !seen.field {
            return Err(self.error("Form-encoded method must contain at least one @Field."));
        }
        if is_multipart && !seen.part {
            return Err(self.error("Multipart method must contain at least one @Part."));
        }
        if let Some(url) = relative_url.as_deref() {
            let path = url.split('?').next().unwrap_or(url);
            for name in placeholders(path) {
                if !seen.path_names.iter().any(|n| n == name) {
                    return Err(self.error(format!(
                        "URL \"{}\" has no @Path parameter for \"{}\".",
                        url, name
                    )));
                }
            }
        }

        tracing::debug!(
            "Parsed {}.{}: {} {}",
            self.service,
            spec.name(),
            method,
            relative_url.as_deref().unwrap_or("<@Url>")
        );

        Ok(MethodDescriptor {
            service: self.service.to_string(),
            name: spec.name().to_string(),
            method,
            relative_url,
            headers,
            content_type,
            has_body: spec.has_body(),
            is_form_encoded,
            is_multipart,
            slots,
            tags: spec.tags().clone(),
            return_type,
            response_converter,
            call_adapter,
        })
    }

    fn encoding(&self) -> Result<(bool, bool)> {
        let encodings = self.spec.encodings();
        if encodings.len() > 1 {
            return Err(self.error("Only one encoding annotation is allowed."));
        }
        let Some(encoding) = encodings.first() else {
            return Ok((false, false));
        };
        if !self.spec.has_body() {
            let name = match encoding {
                Encoding::FormUrlEncoded => "FormUrlEncoded",
                Encoding::Multipart => "Multipart",
            };
            return Err(self.error(format!(
                "{} can only be specified on HTTP methods with request body (e.g., @POST).",
                name
            )));
        }
        Ok((
            *encoding == Encoding::FormUrlEncoded,
            *encoding == Encoding::Multipart,
        ))
    }

    fn relative_url(&self) -> Result<Option<String>> {
        let path = self.spec.path();
        if path.is_empty() {
            return Ok(None);
        }

        let (template, query) = match path.split_once('?') {
            Some((template, query)) => (template, Some(query)),
            None => (path, None),
        };
        if let Some(query) = query {
            if blocks(query).into_iter().any(is_valid_name) {
                return Err(self.error(format!(
                    "URL query string \"{}\" must not have replace block. \
                     For dynamic query parameters use @Query.",
                    query
                )));
            }
        }
        for name in blocks(template) {
            if !is_valid_name(name) {
                return Err(self.error(format!(
                    "URL path \"{}\" has invalid placeholder \"{{{}}}\"; \
                     names must match [a-zA-Z][a-zA-Z0-9_-]*.",
                    template, name
                )));
            }
        }
        Ok(Some(path.to_string()))
    }

    fn static_headers(&self) -> Result<(HeaderMap, Option<String>)> {
        let mut headers = HeaderMap::new();
        let mut content_type = None;
        for header in self.spec.static_headers() {
            let Some((name, value)) = header.split_once(':') else {
                return Err(self.error(format!(
                    "@Headers value must be in the form \"Name: Value\". Found: \"{}\"",
                    header
                )));
            };
            let (name, value) = (name.trim(), value.trim());
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| self.error(format!("Malformed header name: \"{}\"", name)))?;
            if header_name == CONTENT_TYPE {
                if !is_media_type(value) {
                    return Err(self.error(format!("Malformed content type: {}", value)));
                }
                content_type = Some(value.to_string());
                continue;
            }
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| self.error(format!("Malformed header value for \"{}\"", name)))?;
            headers.append(header_name, header_value);
        }
        Ok((headers, content_type))
    }

    fn encoding_required(&self, index: usize, role: &ParamRole, encoding: &str) -> JianjiaError {
        self.param_error(
            index,
            format!(
                "{} parameters can only be used with {} encoding.",
                role.label(),
                encoding
            ),
        )
    }

    fn parameter(
        &self,
        index: usize,
        param: &ParamSpec,
        seen: &mut Seen,
        relative_url: Option<&str>,
        is_form_encoded: bool,
        is_multipart: bool,
    ) -> Result<ParameterHandler> {
        let role = param.role();
        let ty = param.type_info();
        let tags = param.tags();
        let string_converter = || {
            self.converters.string_converter(&ty, tags).map_err(|e| {
                self.param_error(
                    index,
                    format!("Unable to create converter for {}\n    {}", ty, e),
                )
            })
        };
        let body_converter = || {
            self.converters
                .request_body_converter(&ty, tags, self.spec.tags())
                .map_err(|e| {
                    self.param_error(
                        index,
                        format!(
                            "Unable to create {} converter for {}\n    {}",
                            role.label(),
                            ty,
                            e
                        ),
                    )
                })
        };
        let verb = self.spec.verb();

        Ok(match role {
            ParamRole::Url => {
                if seen.url {
                    return Err(self.param_error(index, "Multiple @Url method annotations found."));
                }
                if seen.path {
                    return Err(
                        self.param_error(index, "@Path parameters may not be used with @Url.")
                    );
                }
                if let Some(query) = seen.query_role() {
                    return Err(self.param_error(
                        index,
                        format!("A {} parameter must not come after a {}.", role.label(), query),
                    ));
                }
                if relative_url.is_some() {
                    return Err(self.param_error(
                        index,
                        format!("@Url cannot be used with @{} URL", verb),
                    ));
                }
                seen.url = true;
                ParameterHandler::Url
            }
            ParamRole::Path { name, encoded } => {
                if let Some(query) = seen.query_role() {
                    return Err(self.param_error(
                        index,
                        format!("A {} parameter must not come after a {}.", role.label(), query),
                    ));
                }
                if seen.url {
                    return Err(
                        self.param_error(index, "@Path parameters may not be used with @Url.")
                    );
                }
                let Some(url) = relative_url else {
                    return Err(self.param_error(
                        index,
                        format!("@Path can only be used with relative url on @{}", verb),
                    ));
                };
                if !is_valid_name(name) {
                    return Err(self.param_error(
                        index,
                        format!(
                            "@Path parameter name must match [a-zA-Z][a-zA-Z0-9_-]*. Found: {}",
                            name
                        ),
                    ));
                }
                let template = url.split('?').next().unwrap_or(url);
                if !placeholders(template).contains(&name.as_str()) {
                    return Err(self.param_error(
                        index,
                        format!("URL \"{}\" does not contain \"{{{}}}\".", url, name),
                    ));
                }
                if seen.path_names.contains(name) {
                    return Err(self.param_error(
                        index,
                        format!("Duplicate @Path parameter \"{}\".", name),
                    ));
                }
                seen.path = true;
                seen.path_names.push(name.clone());
                ParameterHandler::Path {
                    name: name.clone(),
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::Query { name, encoded } => {
                seen.query = true;
                ParameterHandler::Query {
                    name: name.clone(),
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::QueryName { encoded } => {
                seen.query_name = true;
                ParameterHandler::QueryName {
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::QueryMap { encoded } => {
                seen.query_map = true;
                ParameterHandler::QueryMap {
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::Header { name } => {
                let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    self.param_error(index, format!("Malformed @Header name \"{}\".", name))
                })?;
                ParameterHandler::Header {
                    name,
                    converter: string_converter()?,
                }
            }
            ParamRole::HeaderMap => ParameterHandler::HeaderMap {
                converter: string_converter()?,
            },
            ParamRole::Field { name, encoded } => {
                if !is_form_encoded {
                    return Err(self.encoding_required(index, role, "form"));
                }
                seen.field = true;
                ParameterHandler::Field {
                    name: name.clone(),
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::FieldMap { encoded } => {
                if !is_form_encoded {
                    return Err(self.encoding_required(index, role, "form"));
                }
                seen.field = true;
                ParameterHandler::FieldMap {
                    encoded: *encoded,
                    converter: string_converter()?,
                }
            }
            ParamRole::Part { name, encoding } => {
                if !is_multipart {
                    return Err(self.encoding_required(index, role, "multipart"));
                }
                seen.part = true;
                ParameterHandler::Part {
                    name: name.clone(),
                    encoding: encoding.clone(),
                    converter: body_converter()?,
                }
            }
            ParamRole::PartMap { encoding } => {
                if !is_multipart {
                    return Err(self.encoding_required(index, role, "multipart"));
                }
                seen.part = true;
                ParameterHandler::PartMap {
                    encoding: encoding.clone(),
                    converter: string_converter()?,
                }
            }
            ParamRole::Body => {
                if is_form_encoded || is_multipart {
                    return Err(self.param_error(
                        index,
                        "@Body parameters cannot be used with form or multi-part encoding.",
                    ));
                }
                if seen.body {
                    return Err(self.param_error(index, "Multiple @Body method annotations found."));
                }
                seen.body = true;
                ParameterHandler::Body {
                    converter: body_converter()?,
                }
            }
        })
    }
}

/// `type/subtype` with optional parameters.
fn is_media_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or("").trim();
    match essence.split_once('/') {
        Some((ty, subtype)) => {
            let token = |s: &str| {
                !s.is_empty()
                    && s.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+*'".contains(&b))
            };
            token(ty) && token(subtype)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{
        DefaultCallAdapterFactory, FutureCallAdapterFactory, ReturnType, ReturnValue,
    };
    use crate::converter::{BuiltInConverters, JsonConverterFactory, ScalarsConverterFactory};
    use crate::executor::InlineExecutor;
    use crate::service::{MethodSpec, ParamSpec};
    use crate::types::TypeInfo;
    use crate::{Call, CallFuture};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Deserialize)]
    struct User {
        #[allow(dead_code)]
        id: u32,
    }

    fn parse_spec(spec: MethodSpec) -> Result<MethodDescriptor> {
        let converters = Converters::new(vec![
            Arc::new(BuiltInConverters),
            Arc::new(ScalarsConverterFactory::new()),
            Arc::new(JsonConverterFactory::new()),
        ]);
        let adapters = CallAdapters::new(vec![
            Arc::new(FutureCallAdapterFactory::new()),
            Arc::new(DefaultCallAdapterFactory::new(Arc::new(InlineExecutor))),
        ]);
        parse("Api", &spec, &converters, &adapters)
    }

    fn reason(spec: MethodSpec) -> String {
        match parse_spec(spec) {
            Ok(_) => panic!("expected a validation error"),
            Err(JianjiaError::Method { reason, service, .. }) => {
                assert_eq!(service, "Api");
                reason
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_simple_get() {
        let d = parse_spec(
            MethodSpec::get("user", "users/{id}")
                .param(ParamSpec::path::<u32>("id"))
                .header("Accept: application/json")
                .returns::<Call<User>>(),
        )
        .unwrap();
        assert_eq!(d.method(), &Method::GET);
        assert_eq!(d.relative_url(), Some("users/{id}"));
        assert_eq!(d.headers().get("accept").unwrap(), "application/json");
        assert!(d.response_type().is::<User>());
        assert_eq!(d.param_count(), 1);
    }

    #[test]
    fn test_missing_return_type() {
        assert_eq!(
            reason(MethodSpec::get("a", "a")),
            "Service methods must declare a return type."
        );
    }

    #[test]
    fn test_empty_verb() {
        let spec = MethodSpec::http("a", "", "a", false).returns::<Call<()>>();
        assert!(reason(spec).starts_with("HTTP method annotation is required"));
    }

    #[test]
    fn test_missing_url() {
        assert_eq!(
            reason(MethodSpec::get("a", "").returns::<Call<()>>()),
            "Missing either @GET URL or @Url parameter."
        );
    }

    #[test]
    fn test_url_parameter() {
        let d = parse_spec(
            MethodSpec::get("a", "")
                .param(ParamSpec::url::<String>())
                .param(ParamSpec::query::<u32>("page"))
                .returns::<Call<()>>(),
        )
        .unwrap();
        assert!(d.relative_url().is_none());

        let after_query = MethodSpec::get("a", "")
            .param(ParamSpec::query::<u32>("page"))
            .param(ParamSpec::url::<String>())
            .returns::<Call<()>>();
        assert_eq!(
            reason(after_query),
            "A @Url parameter must not come after a @Query. (parameter #2)"
        );

        let with_path = MethodSpec::get("a", "a")
            .param(ParamSpec::url::<String>())
            .returns::<Call<()>>();
        assert_eq!(reason(with_path), "@Url cannot be used with @GET URL (parameter #1)");

        let twice = MethodSpec::get("a", "")
            .param(ParamSpec::url::<String>())
            .param(ParamSpec::url::<String>())
            .returns::<Call<()>>();
        assert!(reason(twice).starts_with("Multiple @Url"));
    }

    #[test]
    fn test_placeholders_must_match_path_params() {
        let unused = MethodSpec::get("a", "users/{id}/{tab}")
            .param(ParamSpec::path::<u32>("id"))
            .returns::<Call<()>>();
        assert_eq!(
            reason(unused),
            "URL \"users/{id}/{tab}\" has no @Path parameter for \"tab\"."
        );

        let unknown = MethodSpec::get("a", "users/{id}")
            .param(ParamSpec::path::<u32>("id"))
            .param(ParamSpec::path::<u32>("other"))
            .returns::<Call<()>>();
        assert_eq!(
            reason(unknown),
            "URL \"users/{id}\" does not contain \"{other}\". (parameter #2)"
        );

        let duplicate = MethodSpec::get("a", "users/{id}")
            .param(ParamSpec::path::<u32>("id"))
            .param(ParamSpec::path::<u32>("id"))
            .returns::<Call<()>>();
        assert!(reason(duplicate).starts_with("Duplicate @Path parameter \"id\"."));

        let repeated = MethodSpec::get("a", "{id}/copy/{id}")
            .param(ParamSpec::path::<u32>("id"))
            .returns::<Call<()>>();
        assert!(parse_spec(repeated).is_ok());
    }

    #[test]
    fn test_placeholder_names() {
        let bad = MethodSpec::get("a", "users/{1id}").returns::<Call<()>>();
        assert!(reason(bad).contains("invalid placeholder \"{1id}\""));

        let bad_param = MethodSpec::get("a", "users/{id}")
            .param(ParamSpec::path::<u32>("i d"))
            .returns::<Call<()>>();
        assert!(reason(bad_param).starts_with("@Path parameter name must match"));
    }

    #[test]
    fn test_query_string_must_not_have_placeholders() {
        let spec = MethodSpec::get("a", "search?q={q}")
            .param(ParamSpec::path::<String>("q"))
            .returns::<Call<()>>();
        assert!(reason(spec)
            .starts_with("URL query string \"q={q}\" must not have replace block."));

        let literal = MethodSpec::get("a", "search?sort=desc").returns::<Call<()>>();
        assert!(parse_spec(literal).is_ok());
    }

    #[test]
    fn test_path_after_query() {
        let spec = MethodSpec::get("a", "users/{id}")
            .param(ParamSpec::query::<u32>("page"))
            .param(ParamSpec::path::<u32>("id"))
            .returns::<Call<()>>();
        assert_eq!(
            reason(spec),
            "A @Path parameter must not come after a @Query. (parameter #2)"
        );
    }

    #[test]
    fn test_static_headers() {
        let malformed = MethodSpec::get("a", "a").header("NoColon").returns::<Call<()>>();
        assert!(reason(malformed).starts_with("@Headers value must be in the form"));

        let bad_type = MethodSpec::post("a", "a")
            .header("Content-Type: nonsense")
            .returns::<Call<()>>();
        assert_eq!(reason(bad_type), "Malformed content type: nonsense");

        let d = parse_spec(
            MethodSpec::post("a", "a")
                .header("Content-Type: text/csv; charset=UTF-8")
                .header("X-Trace: 1")
                .header("X-Trace: 2")
                .returns::<Call<()>>(),
        )
        .unwrap();
        assert_eq!(d.content_type(), Some("text/csv; charset=UTF-8"));
        assert!(d.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(d.headers().get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn test_encoding_rules() {
        let both = MethodSpec::post("a", "a")
            .form_url_encoded()
            .multipart()
            .returns::<Call<()>>();
        assert_eq!(reason(both), "Only one encoding annotation is allowed.");

        let get_form = MethodSpec::get("a", "a")
            .form_url_encoded()
            .param(ParamSpec::field::<String>("x"))
            .returns::<Call<()>>();
        assert!(reason(get_form).starts_with("FormUrlEncoded can only be specified"));

        let empty_form = MethodSpec::post("a", "a").form_url_encoded().returns::<Call<()>>();
        assert_eq!(reason(empty_form), "Form-encoded method must contain at least one @Field.");

        let empty_multipart = MethodSpec::post("a", "a").multipart().returns::<Call<()>>();
        assert_eq!(reason(empty_multipart), "Multipart method must contain at least one @Part.");

        let stray_field = MethodSpec::post("a", "a")
            .param(ParamSpec::field::<String>("x"))
            .returns::<Call<()>>();
        assert!(reason(stray_field)
            .starts_with("@Field parameters can only be used with form encoding."));

        let stray_part = MethodSpec::post("a", "a")
            .param(ParamSpec::part::<String>("x"))
            .returns::<Call<()>>();
        assert!(reason(stray_part).starts_with("@Part parameters can only be used with multipart"));

        let stray_field_map = MethodSpec::post("a", "a")
            .param(ParamSpec::field_map::<HashMap<String, String>>())
            .returns::<Call<()>>();
        assert_eq!(
            reason(stray_field_map),
            "@FieldMap parameters can only be used with form encoding. (parameter #1)"
        );

        let stray_part_map = MethodSpec::post("a", "a")
            .form_url_encoded()
            .param(ParamSpec::field::<String>("x"))
            .param(ParamSpec::part_map::<HashMap<String, String>>())
            .returns::<Call<()>>();
        assert_eq!(
            reason(stray_part_map),
            "@PartMap parameters can only be used with multipart encoding. (parameter #2)"
        );
    }

    #[test]
    fn test_body_rules() {
        let get_body = MethodSpec::get("a", "a")
            .param(ParamSpec::body::<String>())
            .returns::<Call<()>>();
        assert_eq!(reason(get_body), "Non-body HTTP method cannot contain @Body.");

        let two = MethodSpec::post("a", "a")
            .param(ParamSpec::body::<String>())
            .param(ParamSpec::body::<String>())
            .returns::<Call<()>>();
        assert!(reason(two).starts_with("Multiple @Body"));

        let form_body = MethodSpec::post("a", "a")
            .form_url_encoded()
            .param(ParamSpec::field::<String>("x"))
            .param(ParamSpec::body::<String>())
            .returns::<Call<()>>();
        assert!(reason(form_body).starts_with("@Body parameters cannot be used with form"));

        let d = parse_spec(
            MethodSpec::post("a", "a")
                .param(ParamSpec::body::<HashMap<String, u32>>())
                .returns::<Call<()>>(),
        )
        .unwrap();
        assert!(d.has_body());
    }

    #[test]
    fn test_head_requires_unit() {
        let spec = MethodSpec::head("a", "a").returns::<Call<String>>();
        assert_eq!(reason(spec), "HEAD method must use () as response type.");
        assert!(parse_spec(MethodSpec::head("a", "a").returns::<Call<()>>()).is_ok());
    }

    #[test]
    fn test_raw_response_body_rejected() {
        let rt = ReturnType::new(
            TypeInfo::of::<Call<()>>(),
            TypeInfo::of::<Call<RawResponse>>(),
            TypeInfo::of::<RawResponse>(),
        );
        let spec = MethodSpec::get("a", "a").returns_type(rt);
        assert!(reason(spec).contains("is not a valid response body type"));
    }

    #[test]
    fn test_unresolvable_return_type() {
        struct Opaque;
        let rt = ReturnType::new(
            TypeInfo::of::<Opaque>(),
            TypeInfo::of::<Opaque>(),
            TypeInfo::of::<String>(),
        );
        let text = reason(MethodSpec::get("a", "a").returns_type(rt));
        assert!(text.starts_with("Unable to create call adapter for"));
        assert!(text.contains("Could not locate call adapter"));
    }

    #[test]
    fn test_future_return_type_resolves() {
        let d = parse_spec(MethodSpec::get("a", "a").returns::<CallFuture<Vec<u8>>>()).unwrap();
        assert!(d.response_type().is::<Vec<u8>>());
        assert_eq!(d.return_type(), &<CallFuture<Vec<u8>> as ReturnValue>::return_type());
    }
}
