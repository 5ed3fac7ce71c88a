//! `CallFuture<T>` adapter: awaiting the future yields the body directly.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use super::{CallAdapter, CallAdapterFactory, CallAdapters, ReturnType, ReturnValue};
use crate::call::{downcast_value, Erased, HttpCall};
use crate::error::{JianjiaError, Result};
use crate::lookup::Lookup;
use crate::types::{Tags, TypeInfo};

type ErasedFuture = BoxFuture<'static, Result<Erased>>;

/// Lazily executed call resolving to the converted body.
///
/// Non-2xx responses resolve to [`JianjiaError::Http`]. A response without a
/// body (204/205) resolves to `()` for unit bodies and is a conversion error
/// otherwise. Nothing is sent until the future is polled.
#[must_use = "futures do nothing unless polled"]
pub struct CallFuture<T> {
    inner: BoxFuture<'static, Result<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Future for CallFuture<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T: DeserializeOwned + Send + 'static> ReturnValue for CallFuture<T> {
    fn return_type() -> ReturnType {
        ReturnType::new(
            TypeInfo::of::<CallFuture<()>>(),
            TypeInfo::of::<CallFuture<T>>(),
            TypeInfo::deserializable::<T>(),
        )
    }

    fn from_adapted(value: Erased) -> Result<Self> {
        let erased = downcast_value::<ErasedFuture>(value)?;
        Ok(Self {
            inner: Box::pin(async move { downcast_value::<T>(erased.await?) }),
            _marker: PhantomData,
        })
    }
}

/// Adapts `CallFuture<T>` return types.
#[derive(Debug, Default, Clone, Copy)]
pub struct FutureCallAdapterFactory;

impl FutureCallAdapterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl CallAdapterFactory for FutureCallAdapterFactory {
    fn name(&self) -> &str {
        "FutureCallAdapterFactory"
    }

    fn get(
        &self,
        return_type: &ReturnType,
        _tags: &Tags,
        _adapters: &CallAdapters,
    ) -> Result<Lookup<Arc<dyn CallAdapter>>> {
        if !return_type.is_raw::<CallFuture<()>>() {
            return Ok(Lookup::Declined);
        }
        Ok(Lookup::Found(Arc::new(FutureCallAdapter {
            response_type: return_type.body(),
        })))
    }
}

struct FutureCallAdapter {
    response_type: TypeInfo,
}

impl CallAdapter for FutureCallAdapter {
    fn response_type(&self) -> TypeInfo {
        self.response_type
    }

    fn adapt(&self, call: HttpCall) -> Result<Erased> {
        let unit_body = self.response_type.is::<()>();
        let future: ErasedFuture = Box::pin(async move {
            let response = call.execute().await?;
            if !response.is_successful() {
                tracing::warn!(
                    "{} {} failed with HTTP {}",
                    call.request().method(),
                    call.request().url(),
                    response.code()
                );
                return Err(JianjiaError::Http {
                    code: response.code(),
                    message: response.message().to_string(),
                });
            }
            match response.into_body() {
                Some(body) => Ok(body),
                None if unit_body => Ok(Box::new(()) as Erased),
                None => Err(JianjiaError::Conversion(
                    "response has no body".to_string(),
                )),
            }
        });
        Ok(Box::new(future))
    }
}
