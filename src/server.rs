//! Server lifecycle: bind, serve, drain on shutdown.

use std::sync::Arc;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::error::Result;
use crate::host::HostInfo;
use crate::{ops, shutdown};

/// Serve `router` on `listener` until `shutdown` is cancelled.
///
/// After cancellation no new connections are accepted; in-flight requests
/// complete before this returns.
pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server drained");
    Ok(())
}

/// Run the service with the given configuration until a termination signal.
pub async fn run(
    config: Config,
    host: Arc<dyn HostInfo>,
    metrics: Option<PrometheusHandle>,
) -> Result<()> {
    let addr = config.socket_addr()?;
    let token = CancellationToken::new();

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on port {}.", config.port);

    tokio::spawn(shutdown::wait_for_signal(token.clone()));
    let ops_handle = tokio::spawn(ops::run_reporter(
        config.ops_interval(),
        token.child_token(),
    ));

    let state = AppState::new(host)
        .with_platform_key(config.details_platform_key)
        .with_metrics(metrics);

    let result = serve(listener, create_router(state), token.clone()).await;

    token.cancel();
    if let Err(e) = ops_handle.await {
        warn!(error = %e, "ops reporter task failed");
    }

    result
}
