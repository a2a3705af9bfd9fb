// http/mod.rs — Public HTTP API server.
//
// Builds the axum router, layers the middleware stack, and runs the server
// with a bounded graceful-shutdown window.
//
// Endpoints:
//   GET    /health
//   GET    /tasks            (?q= substring filter)
//   POST   /tasks
//   GET    /tasks/{id}
//   PATCH  /tasks/{id}
//   DELETE /tasks/{id}

pub mod error;
pub mod middleware;
pub mod routes;

use std::future::IntoFuture as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::AppContext;

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(routes::tasks::get_task)
                .patch(routes::tasks::patch_task)
                .delete(routes::tasks::delete_task),
        )
        .fallback(routes::invalid_path)
        // Innermost first: preflight short-circuit, then request logging,
        // then CORS headers on everything that goes out.
        .layer(from_fn(middleware::preflight))
        .layer(from_fn(middleware::trace_requests))
        .layer(middleware::cors_layer())
        .with_state(ctx)
}

/// Bind and serve until a shutdown signal arrives, then drain in-flight
/// requests for at most [`SHUTDOWN_GRACE`] before giving up.
pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse().context("invalid bind address")?;

    let router = build_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(draining.clone()))
        .into_future();

    tokio::select! {
        res = server => {
            res.context("server error")?;
            info!("server stopped");
        }
        _ = drain_deadline(draining) => {
            warn!(
                grace_secs = SHUTDOWN_GRACE.as_secs(),
                "drain window expired, aborting in-flight requests"
            );
        }
    }
    Ok(())
}

/// Resolves when a shutdown signal is received.
///
/// On Unix we listen for SIGTERM *and* Ctrl-C.
/// On other platforms we listen for Ctrl-C only.
async fn shutdown_signal(draining: Arc<Notify>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    info!("shutdown signal received");
    draining.notify_one();
}

async fn drain_deadline(draining: Arc<Notify>) {
    draining.notified().await;
    tokio::time::sleep(SHUTDOWN_GRACE).await;
}
