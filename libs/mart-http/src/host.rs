use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::config::HttpConfig;
use crate::request_id::{create_trace_layer, header, push_req_id_to_extensions, MakeReqId};

/// Handler timeout used when the configured one is zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Wrap module routes with `/health` and the shared middleware stack.
///
/// Outermost first: body limit, CORS (optional), timeout, request id
/// (set + propagate), trace span, request id into extensions.
/// A zero `timeout` selects [`DEFAULT_TIMEOUT`].
pub fn build_router(api: Router, cfg: &HttpConfig, timeout: Duration) -> Router {
    let x_request_id = header();
    let timeout = if timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        timeout
    };

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(from_fn(push_req_id_to_extensions))
        .layer(create_trace_layer())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeReqId))
        .layer(TimeoutLayer::new(timeout));

    if cfg.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
}

/// Bind `addr` and serve until SIGINT/SIGTERM.
pub async fn serve(router: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "signal listener failed; shutting down");
            }
            tracing::info!("shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

pub async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
