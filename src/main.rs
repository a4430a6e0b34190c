//! Diagnostic HTTP service entry point.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hostprobe::config::{Config, LogFormat};
use hostprobe::host::SystemHost;
use hostprobe::{metrics, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_tracing(&config);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    // Initialize metrics
    let handle = if config.metrics_enabled {
        let handle = metrics::install_recorder()?;
        metrics::init_metrics();
        Some(handle)
    } else {
        None
    };

    info!(
        port = config.port,
        platform_key = %config.details_platform_key,
        metrics = config.metrics_enabled,
        "Configuration loaded"
    );

    server::run(config, Arc::new(SystemHost::new()), handle).await?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
