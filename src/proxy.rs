//! Dispatch proxy - the per-service entry point.
//!
//! [`ServiceProxy::invoke`] looks up the method's descriptor (parsing it on
//! first use), builds the request from the arguments, wraps it in an
//! [`HttpCall`] and lets the method's call adapter shape the result.
//!
//! Descriptors live in the client's [`DescriptorCache`], so every proxy
//! created from one client shares them. Hits never take a lock. Misses
//! serialize on a parse lock and re-check the cache before parsing, which
//! keeps one descriptor per (client, service, method) even under concurrent
//! first calls.
//!
//! # Example
//!
//! ```ignore
//! struct GitHub(ServiceProxy);
//!
//! impl GitHub {
//!     fn contributors(&self, owner: &str, repo: &str) -> jianjia::Result<Call<Vec<Contributor>>> {
//!         self.0.invoke(
//!             "contributors",
//!             Args::new().with(owner.to_string()).with(repo.to_string()),
//!         )
//!     }
//! }
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::adapter::ReturnValue;
use crate::call::HttpCall;
use crate::client::Client;
use crate::error::{JianjiaError, Result};
use crate::method::{parse, MethodDescriptor};
use crate::service::ServiceSpec;
use crate::types::Args;

/// Parsed descriptors of one client, keyed by service identity and method.
#[derive(Default)]
pub(crate) struct DescriptorCache {
    entries: DashMap<(u64, String), Arc<MethodDescriptor>>,
    parse_lock: Mutex<()>,
}

impl DescriptorCache {
    fn get(&self, service: u64, method: &str) -> Option<Arc<MethodDescriptor>> {
        self.entries
            .get(&(service, method.to_string()))
            .map(|found| Arc::clone(found.value()))
    }

    /// Cached descriptor, parsing and inserting it on a miss.
    ///
    /// Parse failures are returned and not cached.
    pub(crate) fn get_or_parse(
        &self,
        client: &Client,
        spec: &ServiceSpec,
        method: &str,
    ) -> Result<Arc<MethodDescriptor>> {
        if let Some(found) = self.get(spec.id(), method) {
            return Ok(found);
        }

        let method_spec = spec.find(method).ok_or_else(|| {
            JianjiaError::UnknownMethod(format!("{}.{}", spec.name(), method))
        })?;

        let _guard = self.parse_lock.lock();
        if let Some(found) = self.get(spec.id(), method) {
            return Ok(found);
        }

        let descriptor = Arc::new(parse(
            spec.name(),
            method_spec,
            client.converters(),
            client.call_adapters(),
        )?);
        self.entries
            .insert((spec.id(), method.to_string()), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Number of descriptors cached for `service`.
    pub(crate) fn count(&self, service: u64) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().0 == service)
            .count()
    }
}

struct ProxyInner {
    client: Client,
    spec: ServiceSpec,
}

/// Handle for invoking the methods of one service.
///
/// Cheap to clone; clones compare equal. Descriptors are shared with every
/// other proxy the same client creates for the same service.
#[derive(Clone)]
pub struct ServiceProxy {
    inner: Arc<ProxyInner>,
}

impl ServiceProxy {
    pub(crate) fn new(client: Client, spec: ServiceSpec) -> Self {
        Self {
            inner: Arc::new(ProxyInner { client, spec }),
        }
    }

    /// The declaration this proxy serves.
    pub fn service(&self) -> &ServiceSpec {
        &self.inner.spec
    }

    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Invoke `method`, returning the shape declared for it.
    ///
    /// `R` must be exactly the declared return type.
    pub fn invoke<R: ReturnValue>(&self, method: &str, args: Args) -> Result<R> {
        let descriptor = self.descriptor(method)?;

        let requested = R::return_type();
        let declared = descriptor.return_type();
        if requested.full() != declared.full() {
            return Err(JianjiaError::ReturnTypeMismatch {
                declared: declared.full().name(),
                requested: requested.full().name(),
            });
        }

        let client = &self.inner.client;
        let request = descriptor.to_request(client.base_url(), &args)?;
        tracing::debug!(
            "{}.{} -> {} {}",
            descriptor.service(),
            descriptor.name(),
            request.method(),
            request.url()
        );

        let call = HttpCall::new(
            request,
            client.transport().clone(),
            descriptor.response_converter().clone(),
        );
        let adapted = descriptor.call_adapter().adapt(call)?;
        R::from_adapted(adapted)
    }

    /// Cached descriptor for `method`, parsed on first request.
    ///
    /// Parse failures are returned and not cached.
    pub fn descriptor(&self, method: &str) -> Result<Arc<MethodDescriptor>> {
        let client = &self.inner.client;
        client
            .descriptors()
            .get_or_parse(client, &self.inner.spec, method)
    }

    /// Parse every declared method, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        for method in self.inner.spec.methods() {
            self.descriptor(method.name())?;
        }
        Ok(())
    }

    /// Number of this service's descriptors parsed so far.
    pub fn cached_descriptors(&self) -> usize {
        self.inner.client.descriptors().count(self.inner.spec.id())
    }
}

impl fmt::Debug for ServiceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceProxy({})", self.inner.spec.name())
    }
}

impl PartialEq for ServiceProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ServiceProxy {}

impl Hash for ServiceProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}
