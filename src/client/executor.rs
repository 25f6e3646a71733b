use std::sync::Arc;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use reqwest::{Method, Request, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::auth::token::AccessToken;
use crate::auth::token_manager::{Credentials, TokenManager};
use crate::client::context::CallContext;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::Envelope;
use crate::utils::constants::LOGIN_PATH;

/// Sends authenticated JSON requests through the transport chain.
pub struct RequestExecutor {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: TokenManager,
}

impl RequestExecutor {
    pub fn new(base_url: &str, credentials: Credentials, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        let login_url = join(&base_url, LOGIN_PATH)?;
        let tokens = TokenManager::new(credentials, login_url, transport.clone());
        Ok(Self { base_url, transport, tokens })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        join(&self.base_url, path)
    }

    /// `endpoint(path)` with `segment` appended as one percent-encoded path segment.
    pub fn endpoint_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base url '{}' cannot carry a path", self.base_url)))?
            .push(segment);
        Ok(url)
    }

    /// Authenticated request without a body.
    pub async fn execute(&self, ctx: &CallContext, method: Method, url: Url) -> Result<Response> {
        self.send_authorized(ctx, build_request(method, url, None)).await
    }

    /// Authenticated request with a JSON body.
    pub async fn execute_json<B>(&self, ctx: &CallContext, method: Method, url: Url, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        self.send_authorized(ctx, build_request(method, url, Some(body))).await
    }

    /// Reads the whole body and classifies it into typed data or an [`crate::ApiError`].
    pub async fn decode<T: DeserializeOwned>(&self, ctx: &CallContext, response: Response) -> Result<T> {
        let status = response.status();
        let raw = ctx
            .run(async { response.bytes().await.map_err(Error::Transport) })
            .await?;
        Envelope::<T>::decode_data(status, &raw)
    }

    // A 401 triggers exactly one forced re-login and one resend; a second 401 is
    // handed back to the caller untouched.
    async fn send_authorized(&self, ctx: &CallContext, mut request: Request) -> Result<Response> {
        let token = self.tokens.ensure_valid(ctx).await?;
        set_bearer(&mut request, &token)?;
        let replay = request.try_clone();

        let response = self.transport.send(ctx, request).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(mut replay) = replay else {
            return Ok(response);
        };
        drop(response);

        warn!("{} {} answered 401, re-authenticating once", replay.method(), replay.url().path());
        let token = self.tokens.force_refresh(ctx).await?;
        set_bearer(&mut replay, &token)?;
        self.transport.send(ctx, replay).await
    }
}

/// Builds a JSON request. The body is attached only for methods that carry one.
pub fn build_request(method: Method, url: Url, body: Option<Vec<u8>>) -> Request {
    let carries_body = matches!(method, Method::POST | Method::PUT | Method::PATCH);
    let mut request = Request::new(method, url);
    request
        .headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let (true, Some(body)) = (carries_body, body) {
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());
    }
    request
}

fn set_bearer(request: &mut Request, token: &AccessToken) -> Result<()> {
    let mut value = HeaderValue::from_str(&token.bearer())
        .map_err(|_| Error::InvalidRequest("access token is not a valid header value".to_owned()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

fn join(base_url: &str, path: &str) -> Result<Url> {
    let raw = format!("{}{}", base_url, path);
    Url::parse(&raw).map_err(|e| Error::Config(format!("invalid url '{}': {}", raw, e)))
}
