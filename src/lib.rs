//! # jianjia
//!
//! Declarative HTTP client binding layer.
//!
//! A service is declared as a table of methods (verb, path template,
//! parameter roles, return shape). Invoking a method turns the arguments into
//! an HTTP request, executes it through a pluggable [`Transport`], converts
//! the response body through a chain of converter factories, and hands the
//! pending call back in the declared shape through a chain of call adapter
//! factories.
//!
//! ## Architecture
//!
//! - **Converters** ([`converter`]): ordered factories for string, request body
//!   and response body conversion
//! - **Call adapters** ([`adapter`]): ordered factories producing [`Call`],
//!   [`CallFuture`], [`Response`] or custom return shapes
//! - **Method descriptors** ([`method`]): each method is validated once and
//!   cached by its [`ServiceProxy`]
//! - **Transport** ([`transport`]): `reqwest` by default
//!
//! ## Example
//!
//! ```ignore
//! use jianjia::converter::JsonConverterFactory;
//! use jianjia::{Args, Call, Client, MethodSpec, ParamSpec, ServiceProxy, ServiceSpec};
//!
//! #[derive(serde::Deserialize)]
//! struct Status {
//!     ok: bool,
//! }
//!
//! struct StatusApi(ServiceProxy);
//!
//! impl StatusApi {
//!     fn status(&self) -> jianjia::Result<Call<Status>> {
//!         self.0.invoke("status", Args::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> jianjia::Result<()> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com/")
//!         .add_converter_factory(JsonConverterFactory::new())
//!         .build()?;
//!
//!     let api = StatusApi(client.create(
//!         &ServiceSpec::new("StatusApi")
//!             .method(MethodSpec::get("status", "status").returns::<Call<Status>>()),
//!     )?);
//!
//!     let response = api.status()?.execute().await?;
//!     assert!(response.body().map_or(false, |s| s.ok));
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod call;
pub mod converter;
pub mod error;
pub mod executor;
pub mod http;
pub mod method;
pub mod service;
pub mod transport;
pub mod types;

mod client;
mod lookup;
mod proxy;

pub use adapter::{CallFuture, ReturnType, ReturnValue};
pub use call::Call;
pub use client::{Client, ClientBuilder, DEFAULT_VALIDATE_EAGERLY};
pub use error::{JianjiaError, Result};
pub use self::http::{Request, RequestBody, Response, ResponseBody};
pub use lookup::Lookup;
pub use method::MethodDescriptor;
pub use proxy::ServiceProxy;
pub use service::{MethodSpec, ParamSpec, ServiceSpec};
pub use transport::Transport;
pub use types::{Arg, Args, Tags, TypeInfo};
