//! `Response<T>` adapter: the call runs to completion inside `adapt`.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::{Handle, RuntimeFlavor};

use super::{CallAdapter, CallAdapterFactory, CallAdapters, ReturnType, ReturnValue};
use crate::call::{downcast_response, downcast_value, Erased, HttpCall};
use crate::error::{JianjiaError, Result};
use crate::http::Response;
use crate::lookup::Lookup;
use crate::types::{Tags, TypeInfo};

/// Adapts `Response<T>` return types by blocking on the exchange.
///
/// Outside a runtime the call is driven on the bound handle. Inside a
/// multi-threaded runtime the worker is handed off with
/// [`tokio::task::block_in_place`]; a current-thread runtime cannot block and
/// the invocation fails with a configuration error.
///
/// # Example
///
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let client = Client::builder()
///     .base_url("https://api.example.com/")?
///     .add_call_adapter_factory(BlockingCallAdapterFactory::new(runtime.handle().clone()))
///     .build()?;
///
/// let response: Response<User> = client.create(&spec)?.invoke("user", Args::new().with(7))?;
/// ```
#[derive(Debug, Clone)]
pub struct BlockingCallAdapterFactory {
    handle: Handle,
}

impl BlockingCallAdapterFactory {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl CallAdapterFactory for BlockingCallAdapterFactory {
    fn name(&self) -> &str {
        "BlockingCallAdapterFactory"
    }

    fn get(
        &self,
        return_type: &ReturnType,
        _tags: &Tags,
        _adapters: &CallAdapters,
    ) -> Result<Lookup<Arc<dyn CallAdapter>>> {
        if !return_type.is_raw::<Response<()>>() {
            return Ok(Lookup::Declined);
        }
        Ok(Lookup::Found(Arc::new(BlockingCallAdapter {
            response_type: return_type.body(),
            handle: self.handle.clone(),
        })))
    }
}

struct BlockingCallAdapter {
    response_type: TypeInfo,
    handle: Handle,
}

impl CallAdapter for BlockingCallAdapter {
    fn response_type(&self) -> TypeInfo {
        self.response_type
    }

    fn adapt(&self, call: HttpCall) -> Result<Erased> {
        let response = block_on(&self.handle, call.execute())?;
        Ok(Box::new(response))
    }
}

fn block_on<F: Future>(handle: &Handle, future: F) -> Result<F::Output> {
    match Handle::try_current() {
        Err(_) => Ok(handle.block_on(future)),
        Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => Err(JianjiaError::Config(
            "blocking calls need a multi-threaded runtime".to_string(),
        )),
    }
}

impl<T: DeserializeOwned + Send + 'static> ReturnValue for Response<T> {
    fn return_type() -> ReturnType {
        ReturnType::new(
            TypeInfo::of::<Response<()>>(),
            TypeInfo::of::<Response<T>>(),
            TypeInfo::deserializable::<T>(),
        )
    }

    fn from_adapted(value: Erased) -> Result<Self> {
        downcast_response(downcast_value::<Response<Erased>>(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ResponseBodyConverter;
    use crate::http::{Method, Request, ResponseBody};
    use crate::transport::MockTransport;
    use std::any::Any;
    use url::Url;

    struct Text;

    impl ResponseBodyConverter for Text {
        fn convert(&self, body: ResponseBody) -> Result<Box<dyn Any + Send>> {
            Ok(Box::new(body.text()?.to_string()))
        }
    }

    fn call(transport: &MockTransport) -> HttpCall {
        let url = Url::parse("http://example.test/status").unwrap();
        HttpCall::new(
            Request::new(Method::GET, url),
            Arc::new(transport.clone()),
            Arc::new(Text),
        )
    }

    fn adapter(handle: Handle) -> Arc<dyn CallAdapter> {
        BlockingCallAdapterFactory::new(handle)
            .get(
                &<Response<String> as ReturnValue>::return_type(),
                &Tags::new(),
                &CallAdapters::default(),
            )
            .unwrap()
            .into_option()
            .unwrap()
    }

    #[test]
    fn test_blocks_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let transport = MockTransport::new();
        transport.enqueue_response(200, "up");

        let adapted = adapter(runtime.handle().clone()).adapt(call(&transport)).unwrap();
        let response = <Response<String> as ReturnValue>::from_adapted(adapted).unwrap();
        assert_eq!(response.body().map(String::as_str), Some("up"));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_error_status_is_a_response() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let transport = MockTransport::new();
        transport.enqueue_response(503, "down");

        let adapted = adapter(runtime.handle().clone()).adapt(call(&transport)).unwrap();
        let response = <Response<String> as ReturnValue>::from_adapted(adapted).unwrap();
        assert_eq!(response.code(), 503);
        assert_eq!(response.error_body().unwrap().text().unwrap(), "down");
    }

    #[test]
    fn test_transport_failure_is_err() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let transport = MockTransport::new();
        transport.enqueue_failure("connection refused");

        let err = adapter(runtime.handle().clone())
            .adapt(call(&transport))
            .err()
            .unwrap();
        assert!(err.is_transport());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocks_inside_multi_thread_runtime() {
        let transport = MockTransport::new();
        transport.enqueue_response(200, "up");

        let adapted = adapter(Handle::current()).adapt(call(&transport)).unwrap();
        let response = <Response<String> as ReturnValue>::from_adapted(adapted).unwrap();
        assert_eq!(response.into_body().as_deref(), Some("up"));
    }

    #[tokio::test]
    async fn test_current_thread_runtime_refuses() {
        let transport = MockTransport::new();
        let err = adapter(Handle::current())
            .adapt(call(&transport))
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert_eq!(transport.request_count(), 0);
    }
}
