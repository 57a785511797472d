//! One-shot invocation: read a proxy event from a file, print the envelope.

use anyhow::{Context, Result};
use restbridge_http::Adapter;
use restbridge_model::{RequestEvent, ResponseEnvelope};
use tracing::info;

/// Parse a proxy event from JSON text.
fn parse_event(raw: &str) -> Result<RequestEvent> {
    serde_json::from_str(raw).context("event file is not a valid proxy event")
}

/// Invoke the adapter once with the event stored at `path` and write the
/// envelope JSON to stdout.
pub async fn run(adapter: &Adapter, path: &str) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read event file: {path}"))?;
    let event = parse_event(&raw)?;

    let handler = adapter.handler();
    let envelope: ResponseEnvelope = handler(event).await;
    info!(status = envelope.status_code, "invocation finished");

    println!("{}", serde_json::to_string(&envelope)?);
    Ok(())
}
