use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use tokio::time::Instant;

use crate::client::context::CallContext;
use crate::error::{Error, Result};
use crate::transport::{Middleware, Transport};

/// What the hook observes once a call through its layer completes.
#[derive(Debug)]
pub struct TraceEvent<'a> {
    pub method: &'a Method,
    pub url: &'a Url,
    pub headers: &'a HeaderMap,
    /// Copy of the request as sent, `None` when its body cannot be cloned.
    pub request: Option<&'a Request>,
    pub outcome: std::result::Result<&'a Response, &'a Error>,
    pub elapsed: Duration,
}

type Hook = dyn Fn(&TraceEvent<'_>) + Send + Sync;

/// Invokes a caller-supplied callback after each call through this layer.
///
/// Placed inside the retry middleware it sees every attempt; placed outside it
/// sees only the final outcome. It never alters the outcome.
#[derive(Clone)]
pub struct TraceHookMiddleware {
    hook: Arc<Hook>,
}

impl TraceHookMiddleware {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&TraceEvent<'_>) + Send + Sync + 'static,
    {
        Self { hook: Arc::new(hook) }
    }
}

impl std::fmt::Debug for TraceHookMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceHookMiddleware").finish_non_exhaustive()
    }
}

impl Middleware for TraceHookMiddleware {
    fn name(&self) -> &'static str {
        "trace_hook"
    }

    fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(TraceHookTransport { next, hook: self.hook.clone() })
    }
}

struct TraceHookTransport {
    next: Arc<dyn Transport>,
    hook: Arc<Hook>,
}

#[async_trait]
impl Transport for TraceHookTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let headers = request.headers().clone();
        let sent = request.try_clone();
        let start = Instant::now();

        let outcome = self.next.send(ctx, request).await;
        (self.hook)(&TraceEvent {
            method: &method,
            url: &url,
            headers: &headers,
            request: sent.as_ref(),
            outcome: outcome.as_ref(),
            elapsed: start.elapsed(),
        });
        outcome
    }
}
