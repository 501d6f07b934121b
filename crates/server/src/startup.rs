use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::cars::CarStore;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    cfg.bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {}: {e}", cfg.bind_addr())))
}

/// Empty store, or one seeded from `store.seed_path`.
pub async fn build_store(cfg: &AppConfig) -> Result<Arc<CarStore>, StartupError> {
    common::env::ensure_seed_file(cfg.store.seed_path.as_deref()).await?;
    let store = match cfg.store.seed_path.as_deref() {
        Some(path) => CarStore::from_seed_file(path).await?,
        None => CarStore::new(),
    };
    Ok(store)
}

/// Router with the in-memory store and built-in views.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    common::env::ensure_static_dir(&cfg.store.static_dir).await;
    let store = build_store(cfg).await?;
    info!(cars = store.len().await, "car store ready");
    let state = AppState::in_memory(store);
    Ok(routes::build_router(state, build_cors(), &cfg.store.static_dir))
}

/// Resolves once `signal` fires; a signal that cannot be installed never resolves.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!(event = "shutdown_signal", "received Ctrl+C, shutting down"),
        Err(e) => {
            // keep serving; the process can still be stopped externally
            warn!(event = "shutdown_signal_unavailable", error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting car server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
