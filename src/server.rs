/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{FedinfoError, FedinfoResult},
};
use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use std::future::Future;
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server and run it until Ctrl-C
///
/// After the interrupt no new connections are accepted. In-flight requests
/// get `shutdown_timeout` to finish before they are aborted.
pub async fn serve(ctx: AppContext) -> FedinfoResult<()> {
    let addr = ctx.config.service.listen.clone();
    let shutdown_timeout = ctx.config.service.shutdown_timeout;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| FedinfoError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("listening on {}", addr);

    let app = build_router(ctx);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                stop_rx.await.ok();
            })
            .await
    });

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = interrupted(tokio::signal::ctrl_c()) => {}
    }

    info!("interrupt received, stopped accepting requests");
    stop_tx.send(()).ok();

    match tokio::time::timeout(shutdown_timeout, &mut server).await {
        Ok(result) => flatten(result),
        Err(_) => {
            warn!(
                "error while shutting down server: requests still running after {:?}",
                shutdown_timeout
            );
            server.abort();
            Ok(())
        }
    }
}

/// Resolve once `signal` fires
///
/// If the signal handler cannot be installed the server keeps running
/// instead of treating the failure as an interrupt.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("failed to listen for interrupt, Ctrl-C will not stop the server: {}", e);
        std::future::pending::<()>().await;
    }
}

fn flatten(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> FedinfoResult<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(FedinfoError::Internal(format!("Server error: {}", e))),
        Err(e) => Err(FedinfoError::Internal(format!("Server task failed: {}", e))),
    }
}
