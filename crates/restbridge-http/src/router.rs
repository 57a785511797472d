//! Service route resolution and verb-to-method mapping.
//!
//! Services are registered under slash-separated paths (`users`,
//! `api/messages`). A request path either names a service exactly, or names
//! a service followed by a single resource id segment:
//!
//! ```text
//! /users          -> service "users",        id None
//! /users/7        -> service "users",        id 7
//! /api/messages/a -> service "api/messages", id "a"
//! ```

use restbridge_model::{ResourceId, ServiceMethod};
use tracing::{debug, warn};

use crate::dispatch::ServiceRegistry;

/// The service and resource id a request path refers to.
///
/// `id` is only ever set together with `service`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Registered service path, without leading slash.
    pub service: Option<String>,
    /// Identifier taken from the trailing path segment.
    pub id: Option<ResourceId>,
}

/// Resolve a request path against the registry.
///
/// The path is used exactly as received; percent-decoding is the job of
/// whoever built the event. The full path is tried first. Failing that, the
/// last segment is taken as the resource id and the remaining path is tried
/// once more. If neither exists, nothing is resolved.
pub async fn resolve_route<R>(path: Option<&str>, registry: &R) -> ResolvedRoute
where
    R: ServiceRegistry + ?Sized,
{
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        warn!("request path is empty, no service to resolve");
        return ResolvedRoute::default();
    };

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut segments: Vec<&str> = trimmed.split('/').collect();

    let full = segments.join("/");
    if registry.service_exists(&full).await {
        let service = full.trim_matches('/').to_owned();
        debug!(path, service = %service, "resolved service");
        return ResolvedRoute {
            service: Some(service),
            id: None,
        };
    }

    let id = segments
        .pop()
        .filter(|s| !s.is_empty())
        .map(ResourceId::from_segment);
    let service = segments.join("/");
    if !registry.service_exists(&service).await {
        debug!(path, "no service registered for path");
        return ResolvedRoute::default();
    }

    let service = service.trim_matches('/').to_owned();
    debug!(path, service = %service, id = ?id, "resolved service and id");
    ResolvedRoute {
        service: Some(service),
        id,
    }
}

/// Map an HTTP verb to a service method.
///
/// The verb is matched case-sensitively. Returns `None` when the verb and id
/// presence have no method.
///
/// | Verb | Id | Method |
/// |------|----|--------|
/// | `GET` | no | `find` |
/// | `GET` | yes | `get` |
/// | `POST` | no | `create` |
/// | `PUT` | yes | `update` |
/// | `PATCH` | yes | `patch` |
/// | `DELETE` | either | `remove` |
#[must_use]
pub fn resolve_method(verb: &str, has_id: bool) -> Option<ServiceMethod> {
    match (verb, has_id) {
        ("GET", false) => Some(ServiceMethod::Find),
        ("GET", true) => Some(ServiceMethod::Get),
        ("POST", false) => Some(ServiceMethod::Create),
        ("PUT", true) => Some(ServiceMethod::Update),
        ("PATCH", true) => Some(ServiceMethod::Patch),
        ("DELETE", _) => Some(ServiceMethod::Remove),
        _ => None,
    }
}
