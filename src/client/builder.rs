use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::auth::token_manager::Credentials;
use crate::client::executor::RequestExecutor;
use crate::client::PayaraClient;
use crate::config::{ClientConfig, Environment};
use crate::error::{Error, Result};
use crate::transport::{chain, HttpTransport, LoggingMiddleware, Middleware, RetryMiddleware, RetryPolicy, Transport};

/// Assembles configuration, then builds an immutable [`PayaraClient`].
///
/// Layer order, outermost first: retry (if configured), the registered
/// middlewares in registration order, request logging (if enabled), the base
/// transport.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    retry: Option<RetryPolicy>,
    middlewares: Vec<Arc<dyn Middleware>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let retry = config.retry.as_ref().map(RetryPolicy::from);
        Self { config, retry, ..Self::default() }
    }

    pub fn credentials(mut self, app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        self.config.app_id = app_id.into();
        self.config.app_secret = app_secret.into();
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.config.log_requests = enabled;
        self
    }

    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Replaces the default `reqwest` transport; the middleware chain still wraps it.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PayaraClient> {
        let config = self.config;
        if config.app_id.trim().is_empty() || config.app_secret.trim().is_empty() {
            return Err(Error::Config("app_id and app_secret are required".to_owned()));
        }

        let base: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(Duration::from_millis(config.timeout_ms()))?),
        };

        let mut layers: Vec<Arc<dyn Middleware>> = Vec::with_capacity(self.middlewares.len() + 2);
        if let Some(policy) = self.retry {
            layers.push(Arc::new(RetryMiddleware::new(policy)));
        }
        layers.extend(self.middlewares);
        if config.log_requests {
            layers.push(Arc::new(LoggingMiddleware::new()));
        }
        debug!(
            "transport layers: {:?}",
            layers.iter().map(|layer| layer.name()).collect::<Vec<_>>()
        );
        let transport = chain(base, &layers);

        let credentials = Credentials { app_id: config.app_id.clone(), app_secret: config.app_secret.clone() };
        let executor = RequestExecutor::new(&config.resolved_base_url(), credentials, transport)?;
        Ok(PayaraClient { inner: Arc::new(executor) })
    }
}
