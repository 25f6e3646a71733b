use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use http::{header::CONTENT_TYPE, StatusCode};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::sync::broadcast::Sender;
use tracing::{error, info};

use crate::callback::{router, CallbackMetrics, CallbackState};
use crate::config::settings::CallbackServerConfig;
use crate::types::CallbackPayload;

#[derive(Clone)]
pub struct MetricsState {
    pub registry: Arc<Registry>,
}

impl MetricsState {
    pub fn new(registry: Registry) -> Self {
        Self { registry: Arc::new(registry) }
    }

    pub fn router(&self, path: &str) -> Router {
        Router::new()
            .route(path, get(get_metrics))
            .with_state(self.clone())
    }
}

async fn get_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, [(CONTENT_TYPE, "text/plain")], String::new());
    }

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        String::from_utf8_lossy(&buffer).into_owned(),
    )
}

/// Callback endpoint plus, when `metrics_path` is set, the prometheus exposition
/// route. Callback counters are registered into `registry` in that case.
pub fn app(
    config: &CallbackServerConfig,
    sender: Sender<CallbackPayload>,
    registry: Registry,
) -> Result<Router> {
    let state = CallbackState::new(sender);
    let Some(metrics_path) = config.metrics_path.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(router(&config.path, state));
    };
    let metrics = CallbackMetrics::register(&registry).context("failed to register callback metrics")?;
    Ok(router(&config.path, state.with_metrics(metrics))
        .merge(MetricsState::new(registry).router(metrics_path)))
}

/// Serve [`app`] until the listener fails.
pub async fn start(
    config: &CallbackServerConfig,
    sender: Sender<CallbackPayload>,
    registry: Registry,
) -> Result<()> {
    let app = app(config, sender, registry)?;
    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind callback listener on {}", bind_addr))?;
    info!("callback receiver listening on {}{}", bind_addr, config.path);
    axum::serve(listener, app).await.context("callback server failed")?;
    Ok(())
}
