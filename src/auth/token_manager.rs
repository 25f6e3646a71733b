use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::HeaderValue;
use reqwest::{Method, Request, Url};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::auth::token::AccessToken;
use crate::client::context::CallContext;
use crate::error::{Error, Result};
use crate::types::{Envelope, LoginData, LoginRequest};
use crate::transport::Transport;

/// App credentials exchanged for a bearer token at login.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .finish()
    }
}

/// Owns the bearer token and refreshes it lazily.
///
/// Readers take a brief read lock and return when the token is usable. Refresh
/// is serialized behind `refresh`; the condition is re-checked once the lock is
/// held so callers that queued behind a refresh reuse its result. The token is
/// only replaced after a fully successful login.
pub struct TokenManager {
    credentials: Credentials,
    login_url: Url,
    transport: Arc<dyn Transport>,
    state: RwLock<Option<AccessToken>>,
    refresh: Mutex<()>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, login_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            login_url,
            transport,
            state: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Returns a usable token, logging in first if there is none or it is about to expire.
    pub async fn ensure_valid(&self, ctx: &CallContext) -> Result<AccessToken> {
        if let Some(token) = self.usable().await {
            return Ok(token);
        }
        let _guard = ctx.run(async { Ok(self.refresh.lock().await) }).await?;
        if let Some(token) = self.usable().await {
            return Ok(token);
        }
        self.refresh_locked(ctx).await
    }

    /// Logs in regardless of the current token, e.g. after the upstream answered 401.
    pub async fn force_refresh(&self, ctx: &CallContext) -> Result<AccessToken> {
        let _guard = ctx.run(async { Ok(self.refresh.lock().await) }).await?;
        warn!("forcing re-login for app '{}'", self.credentials.app_id);
        self.refresh_locked(ctx).await
    }

    /// Snapshot of the current token, usable or not.
    pub async fn current(&self) -> Option<AccessToken> {
        self.state.read().await.clone()
    }

    async fn usable(&self) -> Option<AccessToken> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_usable())
            .cloned()
    }

    // caller holds `self.refresh`
    async fn refresh_locked(&self, ctx: &CallContext) -> Result<AccessToken> {
        match self.login(ctx).await {
            Ok(token) => {
                info!(
                    "logged in as merchant '{}', token valid until {}",
                    token.merchant_id, token.expires_at
                );
                *self.state.write().await = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                warn!("login failed for app '{}': {}", self.credentials.app_id, e);
                Err(e)
            }
        }
    }

    /// `POST /api/v1/login` without a bearer header. Does not touch stored state.
    async fn login(&self, ctx: &CallContext) -> Result<AccessToken> {
        let body = serde_json::to_vec(&LoginRequest {
            username: self.credentials.app_id.clone(),
            password: self.credentials.app_secret.clone(),
        })?;
        let mut request = Request::new(Method::POST, self.login_url.clone());
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());

        let response = self.transport.send(ctx, request).await?;
        let status = response.status();
        let raw = ctx.run(async { response.bytes().await.map_err(Error::Transport) }).await?;
        let data = Envelope::<LoginData>::decode_data(status, &raw)?;
        Ok(AccessToken::from_login(data))
    }
}
