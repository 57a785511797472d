//! Gateway service that turns live HTTP requests into adapter events.
//!
//! Each request is converted into a [`RequestEvent`] the way an API Gateway
//! proxy integration would build it, handed to the [`Adapter`], and the
//! resulting envelope is written back as the HTTP response.
//!
//! Health-check endpoints (`/_health`, `/health`) are intercepted at the
//! gateway level and never reach a service.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::Service;
use percent_encoding::percent_decode_str;
use restbridge_http::Adapter;
use restbridge_http::response::{self, error_to_envelope};
use restbridge_model::{BridgeError, RequestEvent, ResponseEnvelope};
use tracing::debug;

/// Header carrying the per-request id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Gateway that feeds incoming HTTP requests through the adapter.
#[derive(Debug, Clone)]
pub struct GatewayService {
    adapter: Adapter,
    services: Vec<String>,
}

impl GatewayService {
    /// Create a new gateway over `adapter`. `services` is reported by the
    /// health check.
    pub fn new(adapter: Adapter, services: Vec<String>) -> Self {
        Self { adapter, services }
    }
}

impl Service<http::Request<Incoming>> for GatewayService {
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let request_id = uuid::Uuid::new_v4().to_string();

        if is_health_check(req.method(), req.uri().path()) {
            let resp = health_check_response(&self.services);
            return Box::pin(async move { Ok(into_response(resp, &request_id)) });
        }

        let adapter = self.adapter.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let envelope = match body.collect().await {
                Ok(collected) => {
                    let event = build_event(&parts.method, &parts.uri, &collected.to_bytes());
                    debug!(
                        request_id = %request_id,
                        method = %event.http_method,
                        path = ?event.path,
                        "forwarding request to adapter",
                    );
                    adapter.handle(&event).await
                }
                Err(e) => error_to_envelope(&BridgeError::malformed_body(e)),
            };
            Ok(into_response(envelope, &request_id))
        })
    }
}

/// Build a proxy event from the request line and body.
///
/// The path is percent-decoded here, as a proxy integration would, so the
/// adapter only ever sees decoded segments. A body that is not valid UTF-8 is
/// base64 encoded.
fn build_event(method: &http::Method, uri: &http::Uri, body: &Bytes) -> RequestEvent {
    let path = percent_decode_str(uri.path()).decode_utf8_lossy();
    let mut event = RequestEvent::new(method.as_str(), path.into_owned());

    if let Some(query) = uri.query() {
        let mut multi: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (k, v) in form_urlencoded::parse(query.as_bytes()) {
            multi.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        event.query_string_parameters = Some(
            multi
                .iter()
                .filter_map(|(k, vs)| vs.last().map(|v| (k.clone(), v.clone())))
                .collect(),
        );
        event.multi_value_query_string_parameters = Some(multi);
    }

    if !body.is_empty() {
        match std::str::from_utf8(body) {
            Ok(text) => event.body = Some(text.to_owned()),
            Err(_) => {
                event.body = Some(BASE64.encode(body));
                event.is_base64_encoded = true;
            }
        }
    }

    event
}

/// Write an envelope back as an HTTP response.
fn into_response(envelope: ResponseEnvelope, request_id: &str) -> http::Response<Full<Bytes>> {
    let status = envelope.status();
    let mut resp = http::Response::new(Full::new(Bytes::from(envelope.body)));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(response::CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(request_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

/// Check if the request is a health check.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Health status listing the registered services.
fn health_check_response(services: &[String]) -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: http::StatusCode::OK.as_u16(),
        body: serde_json::json!({ "status": "running", "services": services }).to_string(),
    }
}
