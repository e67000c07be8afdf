//! Request dispatch and the awaitable/callback calling conventions.
//!
//! # Design
//! Every call is a single boxed future wrapped in [`Call`]. Awaiting the
//! `Call` is the primary style; [`Call::callback`] is a thin adapter that
//! spawns that same future and forwards its settlement to a closure. There
//! is no second code path, and because the closure is `FnOnce` and `Call` is
//! consumed, the callback runs exactly once.

use std::future::{Future, IntoFuture};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::format;
use crate::http::{
    Computed, HttpMethod, HttpResponse, RequestArgs, RequestDefaults, RequestOptions, Transport,
};

/// A pending call. Await it, or hand it a callback.
#[must_use = "a Call does nothing until it is awaited or given a callback"]
pub struct Call<T = Value> {
    future: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> Call<T> {
    pub(crate) fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    pub(crate) fn failed(error: ApiError) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    pub(crate) fn map<U, F>(self, f: F) -> Call<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Call::new(self.future.map(|result| result.map(f)))
    }

    /// Runs the call on the current tokio runtime and invokes `callback`
    /// once with the outcome, from the spawned task.
    ///
    /// Outside a runtime nothing is sent: the callback runs synchronously,
    /// before this method returns, with [`ApiError::NoRuntime`]. That is the
    /// only case in which it is not invoked asynchronously.
    pub fn callback<F>(self, callback: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { callback(self.future.await) });
            }
            Err(_) => callback(Err(ApiError::NoRuntime)),
        }
    }
}

impl Call<Value> {
    /// Awaits the call and deserializes the body.
    pub async fn json<D: DeserializeOwned>(self) -> Result<D> {
        let value = self.future.await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<T> IntoFuture for Call<T> {
    type Output = Result<T>;
    type IntoFuture = BoxFuture<'static, Result<T>>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

/// Merges call arguments with client defaults and issues exactly one
/// request per call through the transport.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn defaults(&self) -> RequestDefaults {
        RequestDefaults {
            json: true,
            auth: self.config.credentials().cloned(),
            headers: self.config.headers().clone(),
        }
    }

    /// The options that `send` would hand to the transport.
    pub fn options(&self, method: HttpMethod, endpoint: &str, args: RequestArgs) -> RequestOptions {
        let computed = Computed {
            method,
            uri: format!("{}{}", self.config.server(), endpoint),
        };
        RequestOptions::merge(&self.defaults(), computed, args)
    }

    /// Issues the request and resolves with the full response, whatever
    /// its status.
    pub fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        args: Option<RequestArgs>,
    ) -> Call<HttpResponse> {
        let options = self.options(method, endpoint, args.unwrap_or_default());
        let transport = Arc::clone(&self.transport);
        let verbose = self.config.is_verbose();
        Call::new(async move { dispatch(transport.as_ref(), options, verbose).await })
    }

    /// Issues the request and resolves with the response body.
    pub fn execute(&self, method: HttpMethod, endpoint: &str, args: Option<RequestArgs>) -> Call {
        self.send(method, endpoint, args).map(|response| response.body)
    }
}

async fn dispatch(
    transport: &dyn Transport,
    options: RequestOptions,
    verbose: bool,
) -> Result<HttpResponse> {
    debug!(method = %options.method, uri = %options.uri, "dispatching request");
    let outcome = transport.send(&options).await;

    if verbose {
        for dump in diagnostics(&options, outcome.as_ref().ok()) {
            info!(target: "readinglist::verbose", "{dump}");
        }
    }

    match &outcome {
        Ok(response) => debug!(status = response.status, uri = %options.uri, "request settled"),
        Err(e) => warn!(error = %e, uri = %options.uri, "request failed"),
    }
    outcome
}

/// Verbose dumps for one settled call. Headers are only reported when a
/// response exists.
fn diagnostics(options: &RequestOptions, response: Option<&HttpResponse>) -> Vec<String> {
    let rendered = match serde_json::to_value(options) {
        Ok(value) => format::pretty_print(&value),
        Err(e) => format!("(unavailable: {e})"),
    };
    let mut dumps = vec![format!("OPTIONS:\n{rendered}\n---")];
    if let Some(response) = response {
        dumps.push(format!(
            "HEADERS:\n{}\n---",
            format::pretty_print(&response.headers_value())
        ));
    }
    dumps
}
