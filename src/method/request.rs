//! Request factory: descriptor + runtime arguments -> [`Request`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{BufMut, BytesMut};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::{Origin, Url};

use super::path::{encode_form, encode_path, encode_query, is_traversal};
use super::MethodDescriptor;
use crate::converter::{RequestBodyConverter, StringConverter};
use crate::error::{JianjiaError, Result};
use crate::http::{Request, RequestBody, FORM_URLENCODED};
use crate::types::{Arg, Args};

/// How one argument is applied to the request under construction.
pub(crate) enum ParameterHandler {
    Url,
    Path {
        name: String,
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    Query {
        name: String,
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    QueryName {
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    QueryMap {
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    Header {
        name: HeaderName,
        converter: Arc<dyn StringConverter>,
    },
    HeaderMap {
        converter: Arc<dyn StringConverter>,
    },
    Field {
        name: String,
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    FieldMap {
        encoded: bool,
        converter: Arc<dyn StringConverter>,
    },
    Part {
        name: String,
        encoding: String,
        converter: Arc<dyn RequestBodyConverter>,
    },
    PartMap {
        encoding: String,
        converter: Arc<dyn StringConverter>,
    },
    Body {
        converter: Arc<dyn RequestBodyConverter>,
    },
}

impl MethodDescriptor {
    /// Materialize a request for one invocation.
    pub(crate) fn to_request(&self, base_url: &Url, args: &Args) -> Result<Request> {
        if args.len() != self.slots.len() {
            return Err(JianjiaError::Argument(format!(
                "{}.{} takes {} arguments, got {}",
                self.service,
                self.name,
                self.slots.len(),
                args.len()
            )));
        }

        let mut builder = RequestBuilder::new(self);
        for (index, (slot, arg)) in self.slots.iter().zip(args.iter()).enumerate() {
            if arg.type_info() != slot.ty {
                return Err(JianjiaError::Argument(format!(
                    "parameter #{} of {}.{} expects {}, got {}",
                    index + 1,
                    self.service,
                    self.name,
                    slot.ty,
                    arg.type_info()
                )));
            }
            builder.apply(&slot.handler, arg)?;
        }
        builder.build(base_url)
    }
}

/// Origin a templated URL must keep: its text before the first
/// placeholder, resolved against the base URL.
///
/// `None` for templates without placeholders, or whose literal prefix does
/// not resolve on its own.
fn template_origin(base_url: &Url, template: &str) -> Option<Origin> {
    let prefix = &template[..template.find('{')?];
    base_url.join(prefix).ok().map(|url| url.origin())
}

struct Part {
    name: String,
    encoding: String,
    body: RequestBody,
}

struct RequestBuilder<'a> {
    descriptor: &'a MethodDescriptor,
    relative_url: Option<String>,
    query: Vec<String>,
    headers: HeaderMap,
    content_type: Option<String>,
    form: Vec<String>,
    parts: Vec<Part>,
    body: Option<RequestBody>,
}

impl<'a> RequestBuilder<'a> {
    fn new(descriptor: &'a MethodDescriptor) -> Self {
        Self {
            descriptor,
            relative_url: descriptor.relative_url.clone(),
            query: Vec::new(),
            headers: descriptor.headers.clone(),
            content_type: descriptor.content_type.clone(),
            form: Vec::new(),
            parts: Vec::new(),
            body: None,
        }
    }

    fn apply(&mut self, handler: &ParameterHandler, arg: &Arg) -> Result<()> {
        match handler {
            ParameterHandler::Url => {
                let url = match arg.downcast_ref::<Url>() {
                    Some(url) => url.to_string(),
                    None => match arg.to_json()? {
                        Value::String(s) => s,
                        Value::Null => {
                            return Err(JianjiaError::Argument(
                                "@Url parameter is null.".to_string(),
                            ))
                        }
                        other => {
                            return Err(JianjiaError::Argument(format!(
                                "@Url parameter must be a string, got {}",
                                other
                            )))
                        }
                    },
                };
                self.relative_url = Some(url);
            }
            ParameterHandler::Path {
                name,
                encoded,
                converter,
            } => {
                if arg.is_absent() {
                    return Err(JianjiaError::Argument(format!(
                        "Path parameter \"{}\" value must not be null.",
                        name
                    )));
                }
                let value = converter.convert(&arg.to_json()?)?;
                let escaped = encode_path(&value, *encoded);
                if is_traversal(&escaped) {
                    return Err(JianjiaError::Argument(format!(
                        "@Path parameters shouldn't perform path traversal ('.' or '..'): {}",
                        value
                    )));
                }
                if let Some(url) = self.relative_url.as_mut() {
                    *url = url.replace(&format!("{{{}}}", name), &escaped);
                }
            }
            ParameterHandler::Query {
                name,
                encoded,
                converter,
            } => {
                for value in values(&arg.to_json()?) {
                    let value = converter.convert(value)?;
                    self.add_query(name, Some(&value), *encoded);
                }
            }
            ParameterHandler::QueryName { encoded, converter } => {
                for value in values(&arg.to_json()?) {
                    let value = converter.convert(value)?;
                    self.add_query(&value, None, *encoded);
                }
            }
            ParameterHandler::QueryMap { encoded, converter } => {
                for (key, value) in &entries(arg, "Query")? {
                    for value in values(value) {
                        let value = converter.convert(value)?;
                        self.add_query(key, Some(&value), *encoded);
                    }
                }
            }
            ParameterHandler::Header { name, converter } => {
                for value in values(&arg.to_json()?) {
                    let value = converter.convert(value)?;
                    self.add_header(name.clone(), value)?;
                }
            }
            ParameterHandler::HeaderMap { converter } => {
                for (key, value) in &entries(arg, "Header")? {
                    let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                        JianjiaError::Argument(format!("Malformed header name \"{}\"", key))
                    })?;
                    for value in values(value) {
                        let value = converter.convert(value)?;
                        self.add_header(name.clone(), value)?;
                    }
                }
            }
            ParameterHandler::Field {
                name,
                encoded,
                converter,
            } => {
                for value in values(&arg.to_json()?) {
                    let value = converter.convert(value)?;
                    self.add_field(name, &value, *encoded);
                }
            }
            ParameterHandler::FieldMap { encoded, converter } => {
                for (key, value) in &entries(arg, "Field")? {
                    for value in values(value) {
                        let value = converter.convert(value)?;
                        self.add_field(key, &value, *encoded);
                    }
                }
            }
            ParameterHandler::Part {
                name,
                encoding,
                converter,
            } => {
                if arg.is_absent() {
                    return Ok(());
                }
                self.parts.push(Part {
                    name: name.clone(),
                    encoding: encoding.clone(),
                    body: converter.convert(arg)?,
                });
            }
            ParameterHandler::PartMap {
                encoding,
                converter,
            } => {
                for (key, value) in &entries(arg, "Part")? {
                    self.parts.push(Part {
                        name: key.clone(),
                        encoding: encoding.clone(),
                        body: RequestBody::text(converter.convert(value)?),
                    });
                }
            }
            ParameterHandler::Body { converter } => {
                if arg.is_absent() {
                    return Err(JianjiaError::Argument(
                        "Body parameter value must not be null.".to_string(),
                    ));
                }
                self.body = Some(converter.convert(arg)?);
            }
        }
        Ok(())
    }

    fn add_query(&mut self, name: &str, value: Option<&str>, encoded: bool) {
        let name = encode_query(name, encoded);
        self.query.push(match value {
            Some(value) => format!("{}={}", name, encode_query(value, encoded)),
            None => name,
        });
    }

    fn add_header(&mut self, name: HeaderName, value: String) -> Result<()> {
        if name == CONTENT_TYPE {
            self.content_type = Some(value);
            return Ok(());
        }
        let value = HeaderValue::from_str(&value).map_err(|_| {
            JianjiaError::Argument(format!("Malformed value for header \"{}\"", name))
        })?;
        self.headers.append(name, value);
        Ok(())
    }

    fn add_field(&mut self, name: &str, value: &str, encoded: bool) {
        self.form.push(format!(
            "{}={}",
            encode_form(name, encoded),
            encode_form(value, encoded)
        ));
    }

    fn build(mut self, base_url: &Url) -> Result<Request> {
        let descriptor = self.descriptor;
        let relative = self.relative_url.take().unwrap_or_default();
        let mut url = base_url.join(&relative).map_err(|e| {
            JianjiaError::Argument(format!(
                "Malformed URL. Base: {}, Relative: {}: {}",
                base_url, relative, e
            ))
        })?;
        if let Some(expected) = descriptor
            .relative_url
            .as_deref()
            .and_then(|template| template_origin(base_url, template))
        {
            if url.origin() != expected {
                return Err(JianjiaError::Argument(format!(
                    "@Path values must not change the request origin: {}",
                    url
                )));
            }
        }
        if !self.query.is_empty() {
            let extra = self.query.join("&");
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, extra),
                _ => extra,
            };
            url.set_query(Some(&query));
        }

        let body = if descriptor.is_form_encoded {
            Some(RequestBody::new(Some(FORM_URLENCODED), self.form.join("&")))
        } else if descriptor.is_multipart {
            Some(multipart_body(&self.parts))
        } else if self.body.is_some() {
            self.body.take()
        } else if descriptor.has_body {
            Some(RequestBody::empty())
        } else {
            None
        };

        let body = match body {
            Some(body) => Some(body.with_content_type(self.content_type.take())),
            None => {
                if let Some(content_type) = self.content_type.take() {
                    let value = HeaderValue::from_str(&content_type).map_err(|_| {
                        JianjiaError::Argument(format!("Malformed content type: {}", content_type))
                    })?;
                    self.headers.insert(CONTENT_TYPE, value);
                }
                None
            }
        };

        Ok(Request::new(descriptor.method.clone(), url)
            .with_headers(self.headers)
            .with_body(body)
            .with_tags(descriptor.tags.clone()))
    }
}

/// Scalars yield themselves, arrays their non-null elements, null nothing.
fn values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
        other => vec![other],
    }
}

/// Entries of a map argument; the map and its values must be present.
fn entries(arg: &Arg, kind: &str) -> Result<Vec<(String, Value)>> {
    let Value::Object(map) = arg.to_json()? else {
        return Err(JianjiaError::Argument(format!("{} map was null.", kind)));
    };
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        if value.is_null() {
            return Err(JianjiaError::Argument(format!(
                "{} map contained null value for key '{}'.",
                kind, key
            )));
        }
        out.push((key, value));
    }
    Ok(out)
}

/// Time-seeded boundary, unique per process through a counter.
fn boundary() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("jianjia-{:016x}-{:x}", nanos, seq)
}

fn multipart_body(parts: &[Part]) -> RequestBody {
    let boundary = boundary();
    let mut buf = BytesMut::new();
    for part in parts {
        buf.put_slice(b"--");
        buf.put_slice(boundary.as_bytes());
        buf.put_slice(b"\r\n");
        buf.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n",
                part.name.replace('"', "%22")
            )
            .as_bytes(),
        );
        buf.put_slice(format!("Content-Transfer-Encoding: {}\r\n", part.encoding).as_bytes());
        if let Some(content_type) = part.body.content_type() {
            buf.put_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        buf.put_slice(format!("Content-Length: {}\r\n\r\n", part.body.len()).as_bytes());
        buf.put_slice(part.body.bytes());
        buf.put_slice(b"\r\n");
    }
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--\r\n");

    let content_type = format!("multipart/form-data; boundary={}", boundary);
    RequestBody::new(Some(&content_type), buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{CallAdapters, DefaultCallAdapterFactory};
    use crate::converter::{
        BuiltInConverters, Converters, JsonConverterFactory, ScalarsConverterFactory,
    };
    use crate::executor::InlineExecutor;
    use crate::method::parse;
    use crate::service::{MethodSpec, ParamSpec};
    use crate::Call;
    use bytes::Bytes;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct NewUser {
        name: String,
    }

    fn descriptor(spec: MethodSpec) -> MethodDescriptor {
        let converters = Converters::new(vec![
            Arc::new(BuiltInConverters),
            Arc::new(ScalarsConverterFactory::new()),
            Arc::new(JsonConverterFactory::new()),
        ]);
        let adapters = CallAdapters::new(vec![Arc::new(DefaultCallAdapterFactory::new(Arc::new(
            InlineExecutor,
        )))]);
        parse("Api", &spec.returns::<Call<()>>(), &converters, &adapters).unwrap()
    }

    fn base() -> Url {
        Url::parse("http://example.test/api/").unwrap()
    }

    fn build(spec: MethodSpec, args: Args) -> Result<Request> {
        descriptor(spec).to_request(&base(), &args)
    }

    #[test]
    fn test_path_substitution_escapes_value() {
        let spec = MethodSpec::get("user", "users/{id}").param(ParamSpec::path::<String>("id"));
        let request = build(spec, Args::new().with("7 a".to_string())).unwrap();
        assert_eq!(request.url().as_str(), "http://example.test/api/users/7%20a");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_absolute_template_replaces_base_path() {
        let spec = MethodSpec::get("user", "/users/{id}").param(ParamSpec::path::<u32>("id"));
        let request = build(spec, Args::new().with(7u32)).unwrap();
        assert_eq!(request.url().as_str(), "http://example.test/users/7");
    }

    #[test]
    fn test_path_slash_and_percent_are_escaped() {
        let spec = MethodSpec::get("file", "files/{name}").param(ParamSpec::path::<String>("name"));
        let request = build(spec, Args::new().with("a/b%20c".to_string())).unwrap();
        assert_eq!(request.url().path(), "/api/files/a%2Fb%2520c");

        let spec = MethodSpec::get("file", "files/{name}")
            .param(ParamSpec::path::<String>("name").encoded());
        let request = build(spec, Args::new().with("a/b%20c".to_string())).unwrap();
        assert_eq!(request.url().path(), "/api/files/a/b%20c");
    }

    #[test]
    fn test_path_value_cannot_change_origin() {
        let spec = || MethodSpec::get("item", "{id}").param(ParamSpec::path::<String>("id"));
        let request = build(spec(), Args::new().with("https:evil.test".to_string())).unwrap();
        assert_eq!(request.url().host_str(), Some("example.test"));
        assert_eq!(request.url().path(), "/api/https%3Aevil.test");

        let encoded = || {
            MethodSpec::get("item", "{id}").param(ParamSpec::path::<String>("id").encoded())
        };
        for value in ["https:evil.test", "//evil.test/x"] {
            let err = build(encoded(), Args::new().with(value.to_string()))
                .err()
                .unwrap();
            assert!(err.to_string().contains("must not change the request origin"));
        }
        let request = build(encoded(), Args::new().with("a/b".to_string())).unwrap();
        assert_eq!(request.url().as_str(), "http://example.test/api/a/b");
    }

    #[test]
    fn test_absolute_template_keeps_its_own_origin() {
        let spec = MethodSpec::get("item", "https://cdn.example.test/items/{id}")
            .param(ParamSpec::path::<String>("id").encoded());
        let request = build(spec, Args::new().with("7".to_string())).unwrap();
        assert_eq!(request.url().as_str(), "https://cdn.example.test/items/7");
    }

    #[test]
    fn test_path_traversal_rejected() {
        let spec = MethodSpec::get("file", "files/{name}").param(ParamSpec::path::<String>("name"));
        let err = build(spec, Args::new().with("..".to_string())).err().unwrap();
        assert!(err.to_string().contains("path traversal"));

        let spec = MethodSpec::get("file", "files/{name}")
            .param(ParamSpec::path::<String>("name").encoded());
        assert!(build(spec, Args::new().with("a/../../b".to_string())).is_err());
    }

    #[test]
    fn test_null_path_rejected() {
        let spec = MethodSpec::get("user", "users/{id}").param(ParamSpec::path::<String>("id"));
        let err = build(spec, Args::new().with_opt::<String>(None)).err().unwrap();
        assert!(err.is_programmer());
    }

    #[test]
    fn test_argument_count_and_type() {
        let spec = || MethodSpec::get("user", "users/{id}").param(ParamSpec::path::<u32>("id"));
        assert!(build(spec(), Args::new()).is_err());
        let err = build(spec(), Args::new().with("7".to_string())).err().unwrap();
        assert!(err.to_string().contains("expects u32"));
    }

    #[test]
    fn test_query_values() {
        let spec = MethodSpec::get("search", "search?sort=desc")
            .param(ParamSpec::query::<String>("q"))
            .param(ParamSpec::query::<Vec<u32>>("id"))
            .param(ParamSpec::query::<String>("skip"))
            .param(ParamSpec::query_name::<String>());
        let args = Args::new()
            .with("a b&c".to_string())
            .with(vec![1u32, 2])
            .with_opt::<String>(None)
            .with("flag".to_string());
        let request = build(spec, args).unwrap();
        assert_eq!(request.url().query(), Some("sort=desc&q=a%20b%26c&id=1&id=2&flag"));
    }

    #[test]
    fn test_encoded_query_kept() {
        let spec =
            MethodSpec::get("search", "search").param(ParamSpec::query::<String>("q").encoded());
        let request = build(spec, Args::new().with("a%20b+c".to_string())).unwrap();
        assert_eq!(request.url().query(), Some("q=a%20b+c"));
    }

    #[test]
    fn test_query_map() {
        let spec = MethodSpec::get("search", "search")
            .param(ParamSpec::query_map::<BTreeMap<String, String>>());
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), "1".to_string());
        map.insert("b c".to_string(), "2".to_string());
        let request = build(spec, Args::new().with(map)).unwrap();
        assert_eq!(request.url().query(), Some("a=1&b%20c=2"));
    }

    #[test]
    fn test_null_maps_rejected() {
        let spec = || {
            MethodSpec::get("search", "search")
                .param(ParamSpec::query_map::<BTreeMap<String, Option<String>>>())
        };
        let err = build(spec(), Args::new().with_opt::<BTreeMap<String, Option<String>>>(None))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument error: Query map was null.");

        let mut map: BTreeMap<String, Option<String>> = BTreeMap::new();
        map.insert("k".to_string(), None);
        let err = build(spec(), Args::new().with(map)).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Argument error: Query map contained null value for key 'k'."
        );
    }

    #[test]
    fn test_url_parameter_replaces_path() {
        let spec = MethodSpec::get("any", "")
            .param(ParamSpec::url::<String>())
            .param(ParamSpec::query::<u32>("page"));
        let args = Args::new().with("https://other.test/x?y=1".to_string()).with(2u32);
        let request = build(spec, args).unwrap();
        assert_eq!(request.url().as_str(), "https://other.test/x?y=1&page=2");

        let spec = MethodSpec::get("any", "").param(ParamSpec::url::<Url>());
        let target = Url::parse("http://example.test/z").unwrap();
        let request = build(spec, Args::new().with_raw(target)).unwrap();
        assert_eq!(request.url().path(), "/z");
    }

    #[test]
    fn test_headers() {
        let spec = MethodSpec::get("h", "h")
            .header("Accept: application/json")
            .param(ParamSpec::header::<String>("X-Token"))
            .param(ParamSpec::header::<Vec<String>>("X-Tag"))
            .param(ParamSpec::header::<String>("X-Absent"))
            .param(ParamSpec::header_map::<BTreeMap<String, u32>>());
        let mut map = BTreeMap::new();
        map.insert("X-Count".to_string(), 3u32);
        let args = Args::new()
            .with("secret".to_string())
            .with(vec!["a".to_string(), "b".to_string()])
            .with_opt::<String>(None)
            .with(map);
        let request = build(spec, args).unwrap();
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("x-token"), Some("secret"));
        assert_eq!(request.headers().get_all("x-tag").iter().count(), 2);
        assert!(request.header("x-absent").is_none());
        assert_eq!(request.header("x-count"), Some("3"));
    }

    #[test]
    fn test_content_type_header_param_overrides_body_type() {
        let spec = MethodSpec::post("p", "p")
            .param(ParamSpec::header::<String>("Content-Type"))
            .param(ParamSpec::body::<String>());
        let args = Args::new().with("text/csv".to_string()).with("a,b".to_string());
        let request = build(spec, args).unwrap();
        let body = request.body().unwrap();
        assert_eq!(body.content_type(), Some("text/csv"));
        assert_eq!(body.bytes().as_ref(), b"a,b");
        assert!(request.header("content-type").is_none());
    }

    #[test]
    fn test_json_body() {
        let spec = MethodSpec::post("create", "users").param(ParamSpec::body::<NewUser>());
        let request = build(spec, Args::new().with(NewUser { name: "ana".into() })).unwrap();
        let body = request.body().unwrap();
        assert_eq!(body.content_type(), Some("application/json; charset=UTF-8"));
        assert_eq!(body.bytes().as_ref(), br#"{"name":"ana"}"#);
    }

    #[test]
    fn test_null_body_rejected() {
        let spec = MethodSpec::post("create", "users").param(ParamSpec::body::<NewUser>());
        assert!(build(spec, Args::new().with_opt::<NewUser>(None)).is_err());
    }

    #[test]
    fn test_body_verb_without_body_sends_empty() {
        let request = build(MethodSpec::post("ping", "ping"), Args::new()).unwrap();
        assert!(request.body().unwrap().is_empty());

        let request = build(MethodSpec::delete("rm", "rm"), Args::new()).unwrap();
        assert!(request.body().is_none());
    }

    #[test]
    fn test_static_content_type_without_body_becomes_header() {
        let spec = MethodSpec::get("g", "g").header("Content-Type: application/json");
        let request = build(spec, Args::new()).unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_form_body() {
        let spec = MethodSpec::post("login", "login")
            .form_url_encoded()
            .param(ParamSpec::field::<String>("user"))
            .param(ParamSpec::field::<String>("skip"))
            .param(ParamSpec::field_map::<BTreeMap<String, String>>());
        let mut extra = BTreeMap::new();
        extra.insert("scope".to_string(), "read write".to_string());
        let args = Args::new()
            .with("a+b@c".to_string())
            .with_opt::<String>(None)
            .with(extra);
        let request = build(spec, args).unwrap();
        let body = request.body().unwrap();
        assert_eq!(body.content_type(), Some(FORM_URLENCODED));
        assert_eq!(
            std::str::from_utf8(body.bytes()).unwrap(),
            "user=a%2Bb%40c&scope=read%20write"
        );
    }

    #[test]
    fn test_multipart_body() {
        let spec = MethodSpec::post("upload", "upload")
            .multipart()
            .param(ParamSpec::part::<String>("title"))
            .param(ParamSpec::part::<Bytes>("file").transfer_encoding("8bit"))
            .param(ParamSpec::part::<String>("skipped"));
        let args = Args::new()
            .with("Holiday".to_string())
            .with_raw(Bytes::from_static(b"\x01\x02"))
            .with_opt::<String>(None);
        let request = build(spec, args).unwrap();
        let body = request.body().unwrap();
        let content_type = body.content_type().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();

        let text = String::from_utf8_lossy(body.bytes());
        assert!(text.starts_with(&format!("--{}\r\n", boundary)));
        assert!(text.ends_with(&format!("--{}--\r\n", boundary)));
        assert!(text.contains("Content-Disposition: form-data; name=\"title\"\r\n"));
        assert!(text.contains("Content-Type: text/plain; charset=UTF-8\r\n"));
        assert!(text.contains("\r\n\r\nHoliday\r\n"));
        assert!(text.contains("Content-Transfer-Encoding: 8bit\r\n"));
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));
        assert!(!text.contains("skipped"));
    }

    #[test]
    fn test_boundaries_differ() {
        assert_ne!(boundary(), boundary());
    }

    #[test]
    fn test_method_tags_travel_with_request() {
        let spec = MethodSpec::get("g", "g").tag("trace", "on");
        let request = build(spec, Args::new()).unwrap();
        assert_eq!(request.tags().get("trace"), Some("on"));
    }
}
