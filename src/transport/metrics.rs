use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use reqwest::{Request, Response};
use tokio::time::Instant;

use crate::client::context::CallContext;
use crate::error::Result;
use crate::transport::{Middleware, Transport};

static ERROR_MSG: &str = "error";

/// Request counters and latency histogram for calls to the upstream API.
#[derive(Clone)]
pub struct HttpMetrics {
    pub requests: IntCounterVec,
    pub duration: HistogramVec,
}

impl HttpMetrics {
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let metrics = Self {
            requests: IntCounterVec::new(
                Opts::new("payara_http_requests_total", "Upstream requests by method and status"),
                &["method", "status"],
            )?,
            duration: HistogramVec::new(
                HistogramOpts::new("payara_http_request_duration_seconds", "Upstream request duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
                &["method"],
            )?,
        };
        registry.register(Box::new(metrics.requests.clone()))?;
        registry.register(Box::new(metrics.duration.clone()))?;
        Ok(metrics)
    }
}

#[derive(Clone)]
pub struct MetricsMiddleware {
    metrics: HttpMetrics,
}

impl MetricsMiddleware {
    pub fn new(metrics: HttpMetrics) -> Self {
        Self { metrics }
    }
}

impl Middleware for MetricsMiddleware {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(MetricsTransport { next, metrics: self.metrics.clone() })
    }
}

struct MetricsTransport {
    next: Arc<dyn Transport>,
    metrics: HttpMetrics,
}

#[async_trait]
impl Transport for MetricsTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        let method = request.method().as_str().to_owned();
        let start = Instant::now();

        let outcome = self.next.send(ctx, request).await;
        self.metrics
            .duration
            .with_label_values(&[method.as_str()])
            .observe(start.elapsed().as_secs_f64());
        let status = match &outcome {
            Ok(resp) => resp.status().as_u16().to_string(),
            Err(_) => ERROR_MSG.to_owned(),
        };
        self.metrics
            .requests
            .with_label_values(&[method.as_str(), status.as_str()])
            .inc();
        outcome
    }
}
