//! `Call<T>` adapter.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{CallAdapter, CallAdapterFactory, CallAdapters, ReturnType, ReturnValue};
use crate::call::{downcast_value, Call, Erased, ExecutorCall, HttpCall};
use crate::error::Result;
use crate::executor::{CallbackExecutor, InlineExecutor};
use crate::lookup::Lookup;
use crate::types::{Tags, TypeInfo};

/// Method tag that delivers `enqueue` callbacks inline instead of through the
/// configured callback executor.
pub const SKIP_CALLBACK_EXECUTOR: &str = "skip_callback_executor";

/// Adapts `Call<T>` return types. Registered last in every client.
pub struct DefaultCallAdapterFactory {
    executor: Arc<dyn CallbackExecutor>,
}

impl DefaultCallAdapterFactory {
    pub fn new(executor: Arc<dyn CallbackExecutor>) -> Self {
        Self { executor }
    }
}

impl CallAdapterFactory for DefaultCallAdapterFactory {
    fn name(&self) -> &str {
        "DefaultCallAdapterFactory"
    }

    fn get(
        &self,
        return_type: &ReturnType,
        tags: &Tags,
        _adapters: &CallAdapters,
    ) -> Result<Lookup<Arc<dyn CallAdapter>>> {
        if !return_type.is_raw::<Call<()>>() {
            return Ok(Lookup::Declined);
        }
        let executor: Arc<dyn CallbackExecutor> = if tags.contains(SKIP_CALLBACK_EXECUTOR) {
            Arc::new(InlineExecutor)
        } else {
            self.executor.clone()
        };
        Ok(Lookup::Found(Arc::new(DefaultCallAdapter {
            response_type: return_type.body(),
            executor,
        })))
    }
}

struct DefaultCallAdapter {
    response_type: TypeInfo,
    executor: Arc<dyn CallbackExecutor>,
}

impl CallAdapter for DefaultCallAdapter {
    fn response_type(&self) -> TypeInfo {
        self.response_type
    }

    fn adapt(&self, call: HttpCall) -> Result<Erased> {
        Ok(Box::new(ExecutorCall::new(call, self.executor.clone())))
    }
}

impl<T: DeserializeOwned + Send + 'static> ReturnValue for Call<T> {
    fn return_type() -> ReturnType {
        ReturnType::new(
            TypeInfo::of::<Call<()>>(),
            TypeInfo::of::<Call<T>>(),
            TypeInfo::deserializable::<T>(),
        )
    }

    fn from_adapted(value: Erased) -> Result<Self> {
        downcast_value::<ExecutorCall>(value).map(Call::from_untyped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;

    #[test]
    fn test_declines_other_shapes() {
        let factory = DefaultCallAdapterFactory::new(Arc::new(InlineExecutor));
        let found = factory
            .get(
                &<Response<u32> as ReturnValue>::return_type(),
                &Tags::new(),
                &CallAdapters::default(),
            )
            .unwrap();
        assert!(!found.is_found());
    }

    #[test]
    fn test_return_type_shape() {
        let rt = <Call<String> as ReturnValue>::return_type();
        assert!(rt.is_raw::<Call<()>>());
        assert!(rt.full().is::<Call<String>>());
        assert!(rt.body().is::<String>());
        assert!(rt.body().is_decodable());
        assert_eq!(rt.raw(), <Call<u8> as ReturnValue>::return_type().raw());
    }

    #[test]
    fn test_from_adapted_rejects_foreign_value() {
        assert!(<Call<String> as ReturnValue>::from_adapted(Box::new(5u8)).is_err());
    }
}
