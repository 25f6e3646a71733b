//! Receiver for disbursement callbacks POSTed by the upstream.
//!
//! Accepted payloads are published on a broadcast channel; the handler only
//! decodes, validates and acknowledges.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use prometheus::{IntCounterVec, Opts, Registry};
use serde_json::json;
use tokio::sync::broadcast::Sender;
use tracing::{info, warn};

use crate::types::CallbackPayload;

pub mod server;

const MISSING_FIELDS_MSG: &str = "Missing required fields: transaction_id, reference_id, status";

/// Callbacks handled by the receiver, by outcome (`received` or `rejected`).
#[derive(Clone)]
pub struct CallbackMetrics {
    pub callbacks: IntCounterVec,
}

impl CallbackMetrics {
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let callbacks = IntCounterVec::new(
            Opts::new("payara_callbacks_total", "Disbursement callbacks by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(callbacks.clone()))?;
        Ok(Self { callbacks })
    }

    fn record(&self, outcome: &str) {
        self.callbacks.with_label_values(&[outcome]).inc();
    }
}

#[derive(Clone)]
pub struct CallbackState {
    sender: Sender<CallbackPayload>,
    metrics: Option<CallbackMetrics>,
}

impl CallbackState {
    pub fn new(sender: Sender<CallbackPayload>) -> Self {
        Self { sender, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: CallbackMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record(outcome);
        }
    }
}

/// Router serving the callback endpoint at `path`. Other methods get 405.
pub fn router(path: &str, state: CallbackState) -> Router {
    Router::new()
        .route(path, post(handle_callback))
        .with_state(state)
}

async fn handle_callback(
    State(state): State<CallbackState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match accept(&headers, &body) {
        Ok(payload) => payload,
        Err(message) => {
            state.record("rejected");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response();
        }
    };

    info!(
        reference_id = %field_str(&payload.reference_id),
        transaction_id = %field_str(&payload.transaction_id),
        status = ?payload.status,
        amount = %field_str(&payload.amount),
        admin_fee = %field_str(&payload.admin_fee),
        is_refund = payload.is_refund,
        "callback received"
    );
    state.record("received");
    // errors only when nobody is subscribed
    let _ = state.sender.send(payload);

    (StatusCode::OK, Json(json!({"status": "received"}))).into_response()
}

fn accept(headers: &HeaderMap, body: &[u8]) -> Result<CallbackPayload, &'static str> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or("").trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err("invalid content type");
    }

    let payload: CallbackPayload = serde_json::from_slice(body).map_err(|e| {
        warn!("callback decode error: {}", e);
        "invalid JSON"
    })?;
    if payload.missing_required() {
        return Err(MISSING_FIELDS_MSG);
    }
    Ok(payload)
}

fn field_str(value: &Option<crate::types::FlexString>) -> &str {
    value.as_ref().map(|v| v.as_str()).unwrap_or("")
}
