//! Client builder and immutable client configuration.
//!
//! The [`ClientBuilder`] provides a fluent API for the base URL, transport,
//! converter and call adapter factories and the callback executor. The built
//! [`Client`] is shared by every service proxy created from it.
//!
//! Factory order:
//! - converters: [`BuiltInConverters`] first, then registered factories
//! - call adapters: registered factories, then [`FutureCallAdapterFactory`]
//!   and [`DefaultCallAdapterFactory`]
//!
//! # Example
//!
//! ```ignore
//! use jianjia::converter::JsonConverterFactory;
//! use jianjia::{Args, Call, Client, MethodSpec, ServiceSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder()
//!         .base_url("https://api.github.com/")
//!         .add_converter_factory(JsonConverterFactory::new())
//!         .validate_eagerly(true)
//!         .build()?;
//!
//!     let github = client.create(
//!         &ServiceSpec::new("GitHub")
//!             .method(MethodSpec::get("zen", "zen").returns::<Call<String>>()),
//!     )?;
//!
//!     let call: Call<String> = github.invoke("zen", Args::new())?;
//!     println!("{:?}", call.execute().await?.body());
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::adapter::{
    CallAdapterFactory, CallAdapters, DefaultCallAdapterFactory, FutureCallAdapterFactory,
};
use crate::converter::{BuiltInConverters, ConverterFactory, Converters};
use crate::error::{JianjiaError, Result};
use crate::executor::{CallbackExecutor, InlineExecutor};
use crate::proxy::{DescriptorCache, ServiceProxy};
use crate::service::ServiceSpec;
use crate::transport::{ReqwestTransport, Transport, TransportConfig};

/// Default for [`ClientBuilder::validate_eagerly`].
pub const DEFAULT_VALIDATE_EAGERLY: bool = false;

/// Builder for configuring and creating a [`Client`].
pub struct ClientBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    converter_factories: Vec<Arc<dyn ConverterFactory>>,
    call_adapter_factories: Vec<Arc<dyn CallAdapterFactory>>,
    callback_executor: Option<Arc<dyn CallbackExecutor>>,
    validate_eagerly: bool,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            transport: None,
            converter_factories: Vec::new(),
            call_adapter_factories: Vec::new(),
            callback_executor: None,
            validate_eagerly: DEFAULT_VALIDATE_EAGERLY,
        }
    }

    /// Set the base URL relative method paths resolve against.
    ///
    /// Must parse and end in `/`; checked by [`build`](Self::build).
    pub fn base_url(mut self, url: impl AsRef<str>) -> Self {
        self.base_url = Some(url.as_ref().to_string());
        self
    }

    /// Set the transport requests are executed on.
    ///
    /// Default: [`ReqwestTransport`] with [`TransportConfig::default()`]
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a preconfigured `reqwest` client as the transport.
    pub fn client(self, client: reqwest::Client) -> Self {
        self.transport(ReqwestTransport::from_client(client))
    }

    /// Register a converter factory. Factories are consulted in registration
    /// order, after the built-in converters.
    pub fn add_converter_factory(mut self, factory: impl ConverterFactory + 'static) -> Self {
        self.converter_factories.push(Arc::new(factory));
        self
    }

    /// Register a call adapter factory. Factories are consulted in
    /// registration order, before the defaults.
    pub fn add_call_adapter_factory(mut self, factory: impl CallAdapterFactory + 'static) -> Self {
        self.call_adapter_factories.push(Arc::new(factory));
        self
    }

    /// Set where `Call::enqueue` callbacks run.
    ///
    /// Default: [`InlineExecutor`]
    pub fn callback_executor(mut self, executor: impl CallbackExecutor) -> Self {
        self.callback_executor = Some(Arc::new(executor));
        self
    }

    /// Parse every method when a service is created instead of on first call.
    ///
    /// Default: false
    pub fn validate_eagerly(mut self, validate: bool) -> Self {
        self.validate_eagerly = validate;
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<Client> {
        let raw = self
            .base_url
            .ok_or_else(|| JianjiaError::Config("Base URL required.".to_string()))?;
        let base_url = Url::parse(&raw)?;
        if !base_url.path().ends_with('/') {
            return Err(JianjiaError::Config(format!(
                "baseUrl must end in /: {}",
                base_url
            )));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(TransportConfig::default())?),
        };
        let callback_executor = self
            .callback_executor
            .unwrap_or_else(|| Arc::new(InlineExecutor));

        let mut converters: Vec<Arc<dyn ConverterFactory>> =
            Vec::with_capacity(self.converter_factories.len() + 1);
        converters.push(Arc::new(BuiltInConverters));
        converters.extend(self.converter_factories.iter().cloned());

        let mut adapters = self.call_adapter_factories.clone();
        adapters.push(Arc::new(FutureCallAdapterFactory::new()));
        adapters.push(Arc::new(DefaultCallAdapterFactory::new(
            callback_executor.clone(),
        )));

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url,
                transport,
                converters: Converters::new(converters),
                call_adapters: CallAdapters::new(adapters),
                converter_factories: self.converter_factories,
                call_adapter_factories: self.call_adapter_factories,
                callback_executor,
                validate_eagerly: self.validate_eagerly,
                descriptors: DescriptorCache::default(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct ClientInner {
    base_url: Url,
    transport: Arc<dyn Transport>,
    converters: Converters,
    call_adapters: CallAdapters,
    /// Registered factories without the built-in ones, for `new_builder`.
    converter_factories: Vec<Arc<dyn ConverterFactory>>,
    call_adapter_factories: Vec<Arc<dyn CallAdapterFactory>>,
    callback_executor: Arc<dyn CallbackExecutor>,
    validate_eagerly: bool,
    descriptors: DescriptorCache,
}

/// Immutable client configuration. Cheap to clone.
///
/// Clones share one descriptor cache; proxies created for the same service
/// reuse each other's parsed methods.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// A builder preloaded with this client's configuration.
    pub fn new_builder(&self) -> ClientBuilder {
        ClientBuilder {
            base_url: Some(self.inner.base_url.to_string()),
            transport: Some(self.inner.transport.clone()),
            converter_factories: self.inner.converter_factories.clone(),
            call_adapter_factories: self.inner.call_adapter_factories.clone(),
            callback_executor: Some(self.inner.callback_executor.clone()),
            validate_eagerly: self.inner.validate_eagerly,
        }
    }

    /// Create a proxy for `spec`.
    ///
    /// Fails on duplicate method names and, with eager validation, on the
    /// first invalid method.
    pub fn create(&self, spec: &ServiceSpec) -> Result<ServiceProxy> {
        let mut names = HashSet::new();
        for method in spec.methods() {
            if !names.insert(method.name()) {
                return Err(JianjiaError::Config(format!(
                    "Service {} declares method \"{}\" more than once.",
                    spec.name(),
                    method.name()
                )));
            }
        }

        let proxy = ServiceProxy::new(self.clone(), spec.clone());
        if self.inner.validate_eagerly {
            proxy.validate()?;
        }
        Ok(proxy)
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    #[inline]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.inner.transport
    }

    /// Full converter chain, built-ins included.
    #[inline]
    pub fn converters(&self) -> &Converters {
        &self.inner.converters
    }

    /// Full call adapter chain, defaults included.
    #[inline]
    pub fn call_adapters(&self) -> &CallAdapters {
        &self.inner.call_adapters
    }

    pub fn callback_executor(&self) -> &Arc<dyn CallbackExecutor> {
        &self.inner.callback_executor
    }

    pub fn is_validate_eagerly(&self) -> bool {
        self.inner.validate_eagerly
    }

    pub(crate) fn descriptors(&self) -> &DescriptorCache {
        &self.inner.descriptors
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("converters", &self.inner.converters.factories().len())
            .field("call_adapters", &self.inner.call_adapters.factories().len())
            .field("validate_eagerly", &self.inner.validate_eagerly)
            .finish()
    }
}
