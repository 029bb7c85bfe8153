//! Application builder: wires router, middleware and state into an Axum app.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use chathub_core::config::AppConfig;
use chathub_core::error::AppError;
use chathub_database::StoreManager;

use crate::middleware::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the ChatHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting ChatHub server...");

    // ── Step 1: Connect the chat store ───────────────────────────
    info!("Connecting chat store (provider: {})...", config.database.provider);
    let store = StoreManager::connect(&config.database).await?;

    // ── Step 2: Wire services and the real-time engine ───────────
    let addr = config.server.bind_address();
    let grace = config.server.shutdown_grace();
    let state = AppState::new(config, store);
    let realtime = state.realtime.clone();

    // ── Step 3: Bind and serve ───────────────────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    info!("ChatHub server listening on {}", addr);

    let signalled = Arc::new(Notify::new());
    let notifier = Arc::clone(&signalled);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            notifier.notify_one();
            realtime.shutdown();
        })
        .into_future();

    // ── Step 4: Drain in-flight requests, bounded by the grace period
    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
        }
        _ = async {
            signalled.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, forcing shutdown");
        }
    }

    info!("ChatHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
