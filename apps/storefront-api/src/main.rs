//! # Storefront API
//!
//! HTTP server for the storefront front end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront API Server                            │
//! │                                                                         │
//! │  Browser ───► HTTP (8080) ───► routes ───► storefront-core             │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                              CartStore                                  │
//! │                             (in memory)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! storefront-api [--config <path>]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use tokio::net::TcpListener;
use tracing::info;

use storefront_api::{init_tracing, router, AppState, StorefrontConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Storefront API server...");

    // An explicit --config must load; otherwise fall back to defaults
    let config = match parse_config_arg()? {
        Some(path) => StorefrontConfig::load(Some(path)).context("Failed to load configuration")?,
        None => StorefrontConfig::load_or_default(None),
    };
    info!(
        bind = %config.bind_address(),
        currency = %config.currency.code,
        coupons = config.catalog.coupons.len(),
        zones = config.catalog.shipping.zones.len(),
        "Configuration loaded"
    );

    let addr = config.bind_address();
    let app = router(AppState::in_memory(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Reads `--config <path>` from the command line.
fn parse_config_arg() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    let mut path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(p) => path = Some(PathBuf::from(p)),
                None => bail!("--config requires a path"),
            },
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(path)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
