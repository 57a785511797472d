//! Service traits, the stock registry, and call dispatch.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use restbridge_model::{ResourceId, ServiceError, ServiceMethod};
use serde_json::Value;

use crate::call::ServiceCall;
use crate::query::Query;

/// Result of a service method.
pub type ServiceResult = Result<Value, ServiceError>;

/// A path-addressable service exposing the RPC method contract.
///
/// Every method is optional. [`supports`](Service::supports) declares which
/// ones exist; the adapter never calls a method the service does not
/// declare. Undeclared methods keep the default body, which fails with 405.
///
/// The trait uses `#[async_trait]` so services can be stored as
/// `Arc<dyn Service>` in a registry.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Whether the service implements `method`.
    fn supports(&self, method: ServiceMethod) -> bool;

    /// List records matching `query`.
    async fn find(&self, query: Query) -> ServiceResult {
        let _ = query;
        Err(ServiceError::method_not_implemented(ServiceMethod::Find))
    }

    /// Fetch the record `id`.
    async fn get(&self, id: ResourceId, query: Query) -> ServiceResult {
        let _ = (id, query);
        Err(ServiceError::method_not_implemented(ServiceMethod::Get))
    }

    /// Create one record, or several when `data` is an array.
    async fn create(&self, data: Value, query: Query) -> ServiceResult {
        let _ = (data, query);
        Err(ServiceError::method_not_implemented(ServiceMethod::Create))
    }

    /// Replace the record `id` with `data`.
    async fn update(&self, id: ResourceId, data: Value, query: Query) -> ServiceResult {
        let _ = (id, data, query);
        Err(ServiceError::method_not_implemented(ServiceMethod::Update))
    }

    /// Merge `data` into the record `id`.
    async fn patch(&self, id: ResourceId, data: Value, query: Query) -> ServiceResult {
        let _ = (id, data, query);
        Err(ServiceError::method_not_implemented(ServiceMethod::Patch))
    }

    /// Remove the record `id`, or every record matching `query` when `id`
    /// is `None`.
    async fn remove(&self, id: Option<ResourceId>, query: Query) -> ServiceResult {
        let _ = (id, query);
        Err(ServiceError::method_not_implemented(ServiceMethod::Remove))
    }
}

/// Lookup of services by path.
///
/// The adapter only reads from the registry. Membership is owned by whoever
/// built it and may change between requests.
#[async_trait]
pub trait ServiceRegistry: Send + Sync + 'static {
    /// Whether a service is registered at `path`.
    async fn service_exists(&self, path: &str) -> bool;

    /// The service registered at `path`.
    async fn get_service(&self, path: &str) -> Option<Arc<dyn Service>>;
}

/// In-process registry backed by a concurrent map.
///
/// Paths are stored without leading or trailing slashes, so `"/users/"`
/// and `"users"` name the same service.
#[derive(Default)]
pub struct ServiceMap {
    services: DashMap<String, Arc<dyn Service>>,
}

impl ServiceMap {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register `service` at `path`, replacing any previous service there.
    pub fn register(&self, path: impl AsRef<str>, service: Arc<dyn Service>) -> &Self {
        self.services
            .insert(strip_slashes(path.as_ref()).to_owned(), service);
        self
    }

    /// Remove the service at `path`.
    pub fn unregister(&self, path: &str) -> Option<Arc<dyn Service>> {
        self.services
            .remove(strip_slashes(path))
            .map(|(_, service)| service)
    }

    /// Registered paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMap")
            .field("paths", &self.paths())
            .finish()
    }
}

#[async_trait]
impl ServiceRegistry for ServiceMap {
    async fn service_exists(&self, path: &str) -> bool {
        self.services.contains_key(strip_slashes(path))
    }

    async fn get_service(&self, path: &str) -> Option<Arc<dyn Service>> {
        self.services
            .get(strip_slashes(path))
            .map(|e| Arc::clone(e.value()))
    }
}

fn strip_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// Invoke a built call on a service.
pub async fn dispatch_call(service: &dyn Service, call: ServiceCall) -> ServiceResult {
    tracing::debug!(method = %call.method(), id = ?call.id(), "dispatching service call");
    match call {
        ServiceCall::Find { query } => service.find(query).await,
        ServiceCall::Get { id, query } => service.get(id, query).await,
        ServiceCall::Create { data, query } => service.create(data, query).await,
        ServiceCall::Update { id, data, query } => service.update(id, data, query).await,
        ServiceCall::Patch { id, data, query } => service.patch(id, data, query).await,
        ServiceCall::Remove { id, query } => service.remove(id, query).await,
    }
}

/// Service that exposes no methods.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedService;

#[async_trait]
impl Service for NotImplementedService {
    fn supports(&self, _method: ServiceMethod) -> bool {
        false
    }
}
