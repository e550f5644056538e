//! HTTP upload endpoint for pageforge.
//!
//! `POST /api/convert` takes a `multipart/form-data` upload and answers with
//! the converted page as JSON. `GET /health` is a liveness check. Every
//! response allows any origin so the upload page can be served elsewhere.

mod multipart;
mod routes;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use pageforge_core::Converter;
use pageforge_shared::{PageForgeError, Result, ServerConfig};
use tracing::{info, warn};

pub use routes::{ServerState, handle};

/// Resolve `host:port` to the first usable socket address.
pub async fn bind_address(config: &ServerConfig) -> Result<SocketAddr> {
    let target = format!("{}:{}", config.host, config.port);
    tokio::net::lookup_host(&target)
        .await
        .map_err(|e| PageForgeError::config(format!("cannot resolve bind address {target}: {e}")))?
        .next()
        .ok_or_else(|| PageForgeError::config(format!("bind address {target} resolved to nothing")))
}

/// Serve until `shutdown` completes, then finish in-flight requests and return.
pub async fn serve<F>(config: &ServerConfig, converter: Converter, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let addr = bind_address(config).await?;
    let state = Arc::new(ServerState::new(converter, config.max_upload_bytes));

    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(state.clone(), req)))
        }
    });

    let server = hyper::Server::try_bind(&addr)
        .map_err(|e| PageForgeError::Server(format!("failed to bind {addr}: {e}")))?
        .serve(make_svc);

    info!(
        addr = %server.local_addr(),
        max_upload_bytes = config.max_upload_bytes,
        "server listening"
    );

    server
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PageForgeError::Server(e.to_string()))?;

    info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed the server
/// runs until killed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
