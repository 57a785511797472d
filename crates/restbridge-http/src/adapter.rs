//! The adapter: one-time setup plus the per-request pipeline.
//!
//! ```text
//! RequestEvent
//!   │  await setup barrier
//!   ▼
//! resolve_route ──► 404 Service not found
//!   ▼
//! resolve_method ─► 404 Method not allowed
//!   ▼
//! normalize_query + decode_body ─► 400 Malformed ...
//!   ▼
//! ServiceCall::build ─► dispatch_call
//!   ▼
//! ResponseEnvelope {"data": ...} / {"error": ...}
//! ```
//!
//! The setup barrier is a single shared future created by
//! [`AdapterBuilder::build`]. The first invocation to poll it runs the setup
//! hook; concurrent invocations wait on the same future, so the hook runs
//! exactly once and finishes before any request is dispatched.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use restbridge_core::Variables;
use restbridge_model::{BridgeError, RequestEvent, ResponseEnvelope};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::call::ServiceCall;
use crate::dispatch::{ServiceRegistry, dispatch_call};
use crate::query::normalize_query;
use crate::request::decode_body;
use crate::response::{error_to_envelope, success_envelope};
use crate::router::{resolve_method, resolve_route};

/// Output of the setup barrier, cloned to every waiter.
type SetupOutput = Result<(), Arc<anyhow::Error>>;

/// Boxed setup hook, called at most once with the adapter's variables.
type SetupHook = Box<dyn FnOnce(Arc<Variables>) -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Builder for [`Adapter`].
pub struct AdapterBuilder {
    registry: Arc<dyn ServiceRegistry>,
    variables: Variables,
    setup: Option<SetupHook>,
}

impl AdapterBuilder {
    /// Set a variable before the adapter is built.
    #[must_use]
    pub fn variable(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.set(key, value);
        self
    }

    /// Install the setup hook. Replaces any previously installed hook.
    ///
    /// The hook receives the adapter's variables and runs once, when the
    /// first request arrives or [`Adapter::ready`] is first awaited.
    #[must_use]
    pub fn setup<F, Fut>(mut self, hook: F) -> Self
    where
        F: FnOnce(Arc<Variables>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.setup = Some(Box::new(move |vars| hook(vars).boxed()));
        self
    }

    /// Build the adapter and its setup barrier.
    #[must_use]
    pub fn build(self) -> Adapter {
        let variables = Arc::new(self.variables);
        let setup = match self.setup {
            Some(hook) => {
                let vars = Arc::clone(&variables);
                async move {
                    debug!("running adapter setup");
                    let outcome = AssertUnwindSafe(async move { hook(vars).await })
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| {
                            Err(anyhow::anyhow!(
                                "setup hook panicked: {}",
                                panic_message(payload.as_ref())
                            ))
                        });
                    match outcome {
                        Ok(()) => {
                            info!("adapter setup complete");
                            Ok(())
                        }
                        Err(e) => {
                            error!(error = %e, "adapter setup failed");
                            Err(Arc::new(e))
                        }
                    }
                }
                .boxed()
            }
            None => future::ready(Ok(())).boxed(),
        };

        Adapter {
            registry: self.registry,
            variables,
            setup: setup.shared(),
        }
    }
}

/// Text of a panic payload, when it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("no message")
}

impl fmt::Debug for AdapterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterBuilder")
            .field("variables", &self.variables)
            .field("setup", &self.setup.as_ref().map(|_| "..."))
            .finish_non_exhaustive()
    }
}

/// Translates gateway events into service calls.
///
/// Cloning is cheap; clones share the registry, the variables, and the
/// setup barrier.
#[derive(Clone)]
pub struct Adapter {
    registry: Arc<dyn ServiceRegistry>,
    variables: Arc<Variables>,
    setup: Shared<BoxFuture<'static, SetupOutput>>,
}

impl Adapter {
    /// Start building an adapter over `registry`.
    pub fn builder<R: ServiceRegistry>(registry: Arc<R>) -> AdapterBuilder {
        AdapterBuilder {
            registry,
            variables: Variables::new(),
            setup: None,
        }
    }

    /// An adapter over `registry` with no setup hook.
    pub fn new<R: ServiceRegistry>(registry: Arc<R>) -> Self {
        Self::builder(registry).build()
    }

    /// Set a variable. Returns `self` so calls can be chained.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.variables.set(key, value);
        self
    }

    /// Get a copy of a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.variables.get(key)
    }

    /// The shared variable store.
    #[must_use]
    pub fn variables(&self) -> &Arc<Variables> {
        &self.variables
    }

    /// The service registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<dyn ServiceRegistry> {
        &self.registry
    }

    /// Wait for the setup hook to finish, running it if nobody has yet.
    pub async fn ready(&self) -> Result<(), BridgeError> {
        self.setup
            .clone()
            .await
            .map_err(|e| BridgeError::setup_failed(format!("{e:#}")))
    }

    /// A cloneable handler function for runtimes that take a closure.
    pub fn handler(
        &self,
    ) -> impl Fn(RequestEvent) -> BoxFuture<'static, ResponseEnvelope> + Clone + Send + Sync + 'static
    {
        info!("handler started");
        let adapter = self.clone();
        move |event| {
            let adapter = adapter.clone();
            async move { adapter.handle(&event).await }.boxed()
        }
    }

    /// Process one event. Every outcome is an envelope.
    pub async fn handle(&self, event: &RequestEvent) -> ResponseEnvelope {
        match self.process(event).await {
            Ok(data) => success_envelope(&data),
            Err(err) => {
                debug!(
                    path = ?event.path,
                    method = %event.http_method,
                    code = %err.code,
                    status = %err.status_code,
                    error = %err.message,
                    "request failed"
                );
                error_to_envelope(&err)
            }
        }
    }

    async fn process(&self, event: &RequestEvent) -> Result<Value, BridgeError> {
        self.ready().await?;

        let path = event.path.as_deref().unwrap_or_default();
        let route = resolve_route(event.path.as_deref(), self.registry.as_ref()).await;

        let Some(service_name) = route.service.as_deref() else {
            return Err(BridgeError::service_not_found(path));
        };
        // Membership may have changed since resolution.
        let Some(service) = self.registry.get_service(service_name).await else {
            return Err(BridgeError::service_not_found(path));
        };

        let method = resolve_method(&event.http_method, route.id.is_some())
            .filter(|m| service.supports(*m))
            .ok_or_else(|| BridgeError::method_not_allowed(&event.http_method))?;

        let query = normalize_query(&event.query_parameters())?;
        let data = decode_body(event)?;

        let call = ServiceCall::build(method, route.id, data, query)
            .ok_or_else(|| BridgeError::method_not_allowed(&event.http_method))?;

        debug!(service = %service_name, method = %method, "invoking service");
        let result = dispatch_call(service.as_ref(), call).await?;
        Ok(result)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("variables", &self.variables)
            .field("setup_done", &self.setup.peek().is_some())
            .finish_non_exhaustive()
    }
}
