//! Pending calls.
//!
//! [`HttpCall`] is the untyped pending call handed to call adapters: it owns
//! the materialized request, the transport and the response converter.
//! [`Call`] is the typed handle the default adapter produces.
//!
//! # Example
//!
//! ```ignore
//! let call: Call<User> = proxy.invoke("user", Args::new().with(7))?;
//!
//! // Await the exchange directly...
//! let response = call.clone().execute().await?;
//!
//! // ...or deliver the result through the callback executor.
//! call.enqueue(|result| match result {
//!     Ok(response) => println!("{:?}", response.body()),
//!     Err(e) => eprintln!("{}", e),
//! });
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::converter::ResponseBodyConverter;
use crate::error::{JianjiaError, Result};
use crate::executor::CallbackExecutor;
use crate::http::{RawResponse, Request, Response};
use crate::transport::Transport;

/// A converted value whose concrete type is only known to the caller.
pub type Erased = Box<dyn Any + Send>;

/// Untyped pending call: request + transport + response converter.
///
/// Executes at most once; clone it for a fresh attempt.
pub struct HttpCall {
    request: Request,
    transport: Arc<dyn Transport>,
    converter: Arc<dyn ResponseBodyConverter>,
    executed: AtomicBool,
}

impl HttpCall {
    pub(crate) fn new(
        request: Request,
        transport: Arc<dyn Transport>,
        converter: Arc<dyn ResponseBodyConverter>,
    ) -> Self {
        Self {
            request,
            transport,
            converter,
            executed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn is_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }

    /// Send the request and convert a successful body.
    ///
    /// Non-2xx responses are returned as `Ok` with an error body; only
    /// transport and conversion failures are `Err`.
    pub async fn execute(&self) -> Result<Response<Erased>> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(JianjiaError::AlreadyExecuted);
        }
        let raw = self
            .transport
            .new_call(self.request.clone())
            .execute()
            .await?;
        self.parse_response(raw)
    }

    fn parse_response(&self, raw: RawResponse) -> Result<Response<Erased>> {
        let (head, body) = raw.into_parts();

        if !head.is_successful() {
            tracing::debug!(
                "{} {} returned {}",
                self.request.method(),
                self.request.url(),
                head.code()
            );
            return Ok(Response::from_parts(head, None, Some(body)));
        }

        // No content: skip the converter.
        if head.code() == 204 || head.code() == 205 {
            return Ok(Response::from_parts(head, None, None));
        }

        let value = self.converter.convert(body)?;
        Ok(Response::from_parts(head, Some(value), None))
    }
}

impl Clone for HttpCall {
    fn clone(&self) -> Self {
        Self::new(
            self.request.clone(),
            self.transport.clone(),
            self.converter.clone(),
        )
    }
}

impl fmt::Debug for HttpCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCall")
            .field("method", self.request.method())
            .field("url", &self.request.url().as_str())
            .field("executed", &self.is_executed())
            .finish()
    }
}

pub(crate) fn downcast_value<T: 'static>(value: Erased) -> Result<T> {
    value.downcast::<T>().map(|v| *v).map_err(|_| {
        JianjiaError::Conversion(format!(
            "response converter did not produce {}",
            std::any::type_name::<T>()
        ))
    })
}

pub(crate) fn downcast_response<T: 'static>(response: Response<Erased>) -> Result<Response<T>> {
    response.map_body(downcast_value::<T>)
}

/// Untyped product of the default call adapter.
pub struct ExecutorCall {
    call: HttpCall,
    executor: Arc<dyn CallbackExecutor>,
}

impl ExecutorCall {
    pub(crate) fn new(call: HttpCall, executor: Arc<dyn CallbackExecutor>) -> Self {
        Self { call, executor }
    }
}

/// Typed pending call returning `Response<T>`.
pub struct Call<T> {
    inner: ExecutorCall,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Call<T> {
    pub(crate) fn from_untyped(inner: ExecutorCall) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn request(&self) -> &Request {
        self.inner.call.request()
    }

    pub fn is_executed(&self) -> bool {
        self.inner.call.is_executed()
    }
}

impl<T: Send + 'static> Call<T> {
    /// Execute on the current task.
    pub async fn execute(&self) -> Result<Response<T>> {
        let response = self.inner.call.execute().await?;
        downcast_response(response)
    }

    /// Execute on the tokio runtime and deliver the outcome through the
    /// callback executor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Response<T>>) + Send + 'static,
    {
        tokio::spawn(async move {
            let result = self.execute().await;
            if let Err(e) = &result {
                tracing::debug!(
                    "{} {} failed: {}",
                    self.request().method(),
                    self.request().url(),
                    e
                );
            }
            self.inner
                .executor
                .execute(Box::new(move || callback(result)));
        })
    }
}

impl<T> Clone for Call<T> {
    fn clone(&self) -> Self {
        Self::from_untyped(ExecutorCall::new(
            self.inner.call.clone(),
            self.inner.executor.clone(),
        ))
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Call").field(&self.inner.call).finish()
    }
}
