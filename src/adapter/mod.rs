//! Call adapter module - what an invocation hands back to the caller.
//!
//! A method's declared return shape (`Call<T>`, `CallFuture<T>`,
//! `Response<T>`, ...) is described by a [`ReturnType`]. The [`CallAdapters`]
//! registry walks its [`CallAdapterFactory`] chain and uses the first adapter
//! that accepts the shape. The adapter reports which body type the response
//! converter must produce and turns the pending [`HttpCall`] into the value
//! returned to the caller.
//!
//! Shipped factories:
//!
//! - [`DefaultCallAdapterFactory`] - `Call<T>`, callbacks through the executor (always last)
//! - [`FutureCallAdapterFactory`] - `CallFuture<T>` resolving to the body
//! - [`BlockingCallAdapterFactory`] - `Response<T>`, executed synchronously (opt-in)

mod blocking;
mod default;
mod future;

use std::sync::Arc;

use crate::call::{Erased, HttpCall};
use crate::error::Result;
use crate::lookup::{not_located, start_after, Lookup};
use crate::types::{Tags, TypeInfo};

pub use blocking::BlockingCallAdapterFactory;
pub use default::{DefaultCallAdapterFactory, SKIP_CALLBACK_EXECUTOR};
pub use future::{CallFuture, FutureCallAdapterFactory};

/// Declared return shape of a service method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnType {
    raw: TypeInfo,
    full: TypeInfo,
    body: TypeInfo,
}

impl ReturnType {
    /// `raw` is the container with its body parameter set to `()`
    /// (e.g. `Call<()>`), `full` the complete type, `body` the type the
    /// response converter produces.
    pub fn new(raw: TypeInfo, full: TypeInfo, body: TypeInfo) -> Self {
        Self { raw, full, body }
    }

    /// Container identity, independent of the body type.
    #[inline]
    pub fn raw(&self) -> TypeInfo {
        self.raw
    }

    #[inline]
    pub fn full(&self) -> TypeInfo {
        self.full
    }

    #[inline]
    pub fn body(&self) -> TypeInfo {
        self.body
    }

    /// Whether the container is `M` (with any body type).
    pub fn is_raw<M: 'static>(&self) -> bool {
        self.raw.is::<M>()
    }
}

/// A typed return shape produced by a call adapter.
///
/// Implemented by [`Call`](crate::Call), [`CallFuture`] and
/// [`Response`](crate::Response); custom adapters implement it for their own
/// shapes.
pub trait ReturnValue: Sized + Send + 'static {
    fn return_type() -> ReturnType;

    /// Re-type the value an adapter returned from [`CallAdapter::adapt`].
    fn from_adapted(value: Erased) -> Result<Self>;
}

/// Turns a pending call into the caller-facing value.
pub trait CallAdapter: Send + Sync {
    /// Body type the response converter must produce.
    fn response_type(&self) -> TypeInfo;

    fn adapt(&self, call: HttpCall) -> Result<Erased>;
}

/// Produces call adapters for the return shapes it understands.
pub trait CallAdapterFactory: Send + Sync {
    /// Name shown in resolution diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn get(
        &self,
        return_type: &ReturnType,
        tags: &Tags,
        adapters: &CallAdapters,
    ) -> Result<Lookup<Arc<dyn CallAdapter>>>;
}

/// Ordered call adapter factory chain.
#[derive(Clone, Default)]
pub struct CallAdapters {
    factories: Vec<Arc<dyn CallAdapterFactory>>,
}

impl CallAdapters {
    pub fn new(factories: Vec<Arc<dyn CallAdapterFactory>>) -> Self {
        Self { factories }
    }

    pub fn factories(&self) -> &[Arc<dyn CallAdapterFactory>] {
        &self.factories
    }

    pub fn call_adapter(
        &self,
        return_type: &ReturnType,
        tags: &Tags,
    ) -> Result<Arc<dyn CallAdapter>> {
        self.next_call_adapter(None, return_type, tags)
    }

    /// Like [`call_adapter`](Self::call_adapter), starting after `skip_past`.
    pub fn next_call_adapter(
        &self,
        skip_past: Option<&dyn CallAdapterFactory>,
        return_type: &ReturnType,
        tags: &Tags,
    ) -> Result<Arc<dyn CallAdapter>> {
        let start = start_after(&self.factories, skip_past);
        for factory in &self.factories[start..] {
            if let Lookup::Found(adapter) = factory.get(return_type, tags, self)? {
                return Ok(adapter);
            }
        }
        let names: Vec<&str> = self.factories.iter().map(|f| f.name()).collect();
        Err(not_located(
            "call adapter",
            return_type.full().name(),
            &names,
            start,
            skip_past.is_some(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InlineExecutor;
    use crate::Call;

    struct Shape;

    struct Never;

    impl CallAdapterFactory for Never {
        fn name(&self) -> &str {
            "Never"
        }

        fn get(
            &self,
            _return_type: &ReturnType,
            _tags: &Tags,
            _adapters: &CallAdapters,
        ) -> Result<Lookup<Arc<dyn CallAdapter>>> {
            Ok(Lookup::Declined)
        }
    }

    /// Accepts `Shape` by wrapping whatever the rest of the chain offers
    /// for `Call<String>`.
    struct Wrapping;

    impl CallAdapterFactory for Wrapping {
        fn get(
            &self,
            return_type: &ReturnType,
            tags: &Tags,
            adapters: &CallAdapters,
        ) -> Result<Lookup<Arc<dyn CallAdapter>>> {
            if !return_type.is_raw::<Shape>() {
                return Ok(Lookup::Declined);
            }
            let inner = adapters.next_call_adapter(
                Some(self as &dyn CallAdapterFactory),
                &<Call<String> as ReturnValue>::return_type(),
                tags,
            )?;
            Ok(Lookup::Found(inner))
        }
    }

    fn shape() -> ReturnType {
        ReturnType::new(
            TypeInfo::of::<Shape>(),
            TypeInfo::of::<Shape>(),
            TypeInfo::of::<String>(),
        )
    }

    #[test]
    fn test_default_adapter_answers_call() {
        let adapters = CallAdapters::new(vec![
            Arc::new(Never),
            Arc::new(DefaultCallAdapterFactory::new(Arc::new(InlineExecutor))),
        ]);
        let adapter = adapters
            .call_adapter(&<Call<u32> as ReturnValue>::return_type(), &Tags::new())
            .unwrap();
        assert!(adapter.response_type().is::<u32>());
    }

    #[test]
    fn test_delegation_skips_self() {
        let adapters = CallAdapters::new(vec![
            Arc::new(Wrapping),
            Arc::new(DefaultCallAdapterFactory::new(Arc::new(InlineExecutor))),
        ]);
        let adapter = adapters.call_adapter(&shape(), &Tags::new()).unwrap();
        assert!(adapter.response_type().is::<String>());
    }

    #[test]
    fn test_unmatched_shape_diagnostic() {
        let adapters = CallAdapters::new(vec![Arc::new(Never), Arc::new(Never)]);
        let err = adapters.call_adapter(&shape(), &Tags::new()).err().unwrap();
        let text = err.to_string();
        assert!(text.starts_with("Could not locate call adapter for "));
        assert!(text.contains("Shape.\n  Tried:\n   * Never\n   * Never"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_skip_past_lists_skipped() {
        let never: Arc<dyn CallAdapterFactory> = Arc::new(Never);
        let adapters = CallAdapters::new(vec![never.clone(), Arc::new(Never)]);
        let err = adapters
            .next_call_adapter(Some(never.as_ref()), &shape(), &Tags::new())
            .err()
            .unwrap();
        assert!(err
            .to_string()
            .ends_with("  Skipped:\n   * Never\n  Tried:\n   * Never"));
    }
}
