//! RestBridge Server - local gateway for RestBridge services.
//!
//! The binary registers one in-memory service per configured path and serves
//! them through the adapter, either as a long-running HTTP gateway or as a
//! single Lambda-style invocation.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 SERVICES=users,api/messages restbridge-server
//! restbridge-server --invoke event.json
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `SERVICES` | `users` | Comma-separated service paths to register |
//! | `ID_FIELD` | `id` | Id field of the in-memory services |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;
mod invoke;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use restbridge_core::BridgeConfig;
use restbridge_http::{Adapter, ServiceMap};
use restbridge_memory::MemoryService;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::gateway::GatewayService;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Logs go to stderr so `--invoke` output on stdout stays clean JSON.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Register an in-memory service for every configured path.
fn build_registry(config: &BridgeConfig) -> Arc<ServiceMap> {
    let registry = Arc::new(ServiceMap::new());
    for path in &config.services {
        info!(service = %path, id_field = %config.id_field, "registering memory service");
        registry.register(path, Arc::new(MemoryService::new(config.id_field.clone())));
    }
    registry
}

/// Build the adapter. Setup publishes the server configuration as variables.
fn build_adapter(config: &BridgeConfig, registry: Arc<ServiceMap>) -> Adapter {
    let services = config.services.clone();
    let id_field = config.id_field.clone();
    Adapter::builder(registry)
        .variable("version", VERSION)
        .setup(move |vars| async move {
            vars.set("services", services).set("idField", id_field);
            Ok(())
        })
        .build()
}

/// Extract the event file path from `--invoke <path>` or `--invoke=<path>`.
fn invoke_arg(args: impl IntoIterator<Item = String>) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--invoke" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--invoke=") {
            return Some(path.to_owned());
        }
    }
    None
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = BridgeConfig::from_env();
    init_tracing(&config.log_level)?;
    config.validate().context("invalid configuration")?;

    let registry = build_registry(&config);
    let adapter = build_adapter(&config, registry);

    if let Some(path) = invoke_arg(std::env::args().skip(1)) {
        return invoke::run(&adapter, &path).await;
    }

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        services = ?config.services,
        version = VERSION,
        "starting RestBridge Server",
    );

    let gateway = GatewayService::new(adapter, config.services.clone());
    serve(listener, gateway).await
}
