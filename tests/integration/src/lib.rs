//! Integration tests for RestBridge.
//!
//! These tests drive a fully built [`Adapter`] over in-memory services, the
//! same way the server binary does, and assert on the response envelopes.
//!
//! Run them with:
//! ```text
//! cargo test -p restbridge-integration
//! ```

use std::sync::{Arc, Once};

use restbridge_http::{Adapter, ServiceMap};
use restbridge_memory::MemoryService;
use restbridge_model::{RequestEvent, ResponseEnvelope};
use serde_json::Value;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A registry with one empty memory service per path.
#[must_use]
pub fn memory_registry(paths: &[&str]) -> Arc<ServiceMap> {
    init_tracing();

    let registry = Arc::new(ServiceMap::new());
    for path in paths {
        registry.register(*path, Arc::new(MemoryService::default()));
    }
    registry
}

/// An adapter over fresh memory services at `paths`.
#[must_use]
pub fn memory_adapter(paths: &[&str]) -> Adapter {
    Adapter::new(memory_registry(paths))
}

/// Send one event and return the envelope with its decoded body.
pub async fn send(adapter: &Adapter, event: RequestEvent) -> (ResponseEnvelope, Value) {
    let envelope = adapter.handle(&event).await;
    let body = envelope
        .json_body()
        .unwrap_or_else(|e| panic!("envelope body is not JSON ({e}): {}", envelope.body));
    (envelope, body)
}

/// Create a record through the adapter and return the stored record.
pub async fn create(adapter: &Adapter, path: &str, body: &Value) -> Value {
    let event = RequestEvent::new("POST", path).with_body(body.to_string());
    let (envelope, body) = send(adapter, event).await;
    assert_eq!(envelope.status_code, 200, "create failed: {}", envelope.body);
    body["data"].clone()
}

mod test_dispatch;
mod test_query;
mod test_setup;
