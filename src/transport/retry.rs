use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};
use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::client::context::CallContext;
use crate::config::settings::RetryConfig;
use crate::error::Result;
use crate::transport::{Middleware, Transport};
use crate::utils::constants::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_BACKOFF_MS,
    DEFAULT_MAX_RETRIES,
};

/// Exponential backoff policy. `max_retries + 1` attempts in total.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let multiplier = cfg
            .multiplier
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_BACKOFF_MULTIPLIER);
        Self {
            max_retries: cfg.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_backoff: Duration::from_millis(
                cfg.initial_backoff_ms.unwrap_or(DEFAULT_INITIAL_BACKOFF_MS),
            ),
            max_backoff: Duration::from_millis(cfg.max_backoff_ms.unwrap_or(DEFAULT_MAX_BACKOFF_MS)),
            multiplier,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// `current * multiplier`, saturating at `max_backoff`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .map_or(self.max_backoff, |next| next.min(self.max_backoff))
    }

    /// Delays slept between consecutive attempts.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.max_retries as usize);
        let mut delay = self.initial_backoff.min(self.max_backoff);
        for _ in 0..self.max_retries {
            delays.push(delay);
            delay = self.next_backoff(delay);
        }
        delays
    }
}

/// Retries transport errors and 5xx responses; anything below 500 is returned at once.
///
/// Every transport error except cancellation is considered retryable. When the
/// attempts run out, the last 5xx response is returned as a response, not an error.
#[derive(Debug, Clone, Default)]
pub struct RetryMiddleware {
    policy: RetryPolicy,
}

impl RetryMiddleware {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Middleware for RetryMiddleware {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn wrap(&self, next: Arc<dyn Transport>) -> Arc<dyn Transport> {
        Arc::new(RetryTransport { next, policy: self.policy.clone() })
    }
}

struct RetryTransport {
    next: Arc<dyn Transport>,
    policy: RetryPolicy,
}

#[async_trait]
impl Transport for RetryTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        let attempts = self.policy.attempts();
        let mut delay = self.policy.initial_backoff.min(self.policy.max_backoff);
        let mut attempt: u32 = 1;

        loop {
            if let Some(err) = ctx.err() {
                return Err(err);
            }

            // the final attempt, or a body that cannot be replayed, consumes the original
            let replay = if attempt < attempts { request.try_clone() } else { None };
            let Some(attempt_request) = replay else {
                let outcome = self.next.send(ctx, request).await;
                match &outcome {
                    Ok(resp) if resp.status().is_server_error() => {
                        error!("all {attempt} attempts failed, last status {}", resp.status())
                    }
                    Err(e) if !e.is_cancellation() && attempt > 1 => {
                        error!("all {attempt} attempts failed: {e}")
                    }
                    _ => {}
                }
                return outcome;
            };

            match self.next.send(ctx, attempt_request).await {
                Ok(resp) if !resp.status().is_server_error() => return Ok(resp),
                Ok(resp) => {
                    warn!("Attempt {attempt}/{attempts} got {}, retrying in {:?}", resp.status(), delay);
                }
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    warn!("Attempt {attempt}/{attempts} failed: {e}, retrying in {:?}", delay);
                }
            }

            tokio::select! {
                biased;
                err = ctx.done() => return Err(err),
                _ = sleep(delay) => {}
            }
            delay = self.policy.next_backoff(delay);
            attempt += 1;
        }
    }
}
