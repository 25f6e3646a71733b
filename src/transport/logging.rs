use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::client::context::CallContext;
use crate::error::Result;
use crate::transport::{Middleware, Transport};

/// Logs method, URL, status and duration of every request passing through.
/// With no subscriber installed this costs a level check per event.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(LoggingTransport { next })
    }
}

struct LoggingTransport {
    next: Arc<dyn Transport>,
}

#[async_trait]
impl Transport for LoggingTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let start = Instant::now();
        debug!(method = %method, url = %url, "payara request");

        let outcome = self.next.send(ctx, request).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(resp) => debug!(
                status = resp.status().as_u16(),
                url = %url,
                duration_ms,
                "payara response"
            ),
            Err(e) => error!(error = %e, url = %url, duration_ms, "payara request failed"),
        }
        outcome
    }
}
