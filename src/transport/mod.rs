//! Transport chain.
//!
//! A [`Transport`] sends one HTTP request and returns the response or an error.
//! A [`Middleware`] decorates a transport with extra behaviour and yields a new
//! transport. The chain is folded once at client construction: the first
//! registered middleware is the outermost layer, so requests pass through the
//! middlewares in registration order and responses come back in reverse.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::client::context::CallContext;
use crate::error::{Error, Result};

pub mod logging;
pub mod metrics;
pub mod retry;
pub mod trace_hook;

pub use logging::LoggingMiddleware;
pub use metrics::{HttpMetrics, MetricsMiddleware};
pub use retry::{RetryMiddleware, RetryPolicy};
pub use trace_hook::{TraceEvent, TraceHookMiddleware};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response>;
}

pub trait Middleware: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport>;
}

/// The innermost transport: a pooled `reqwest` client raced against the call context.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        ctx.run(async { self.client.execute(request).await.map_err(Error::Transport) })
            .await
    }
}

/// Wraps `base` in `middlewares`, first element outermost.
pub fn chain(base: Arc<dyn Transport>, middlewares: &[Arc<dyn Middleware>]) -> Arc<dyn Transport> {
    middlewares
        .iter()
        .rev()
        .fold(base, |next, middleware| middleware.wrap(next))
}
