// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Request, Response, Url};

use crate::client::CallContext;
use crate::error::Result;
use crate::transport::Transport;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn empty_request(path: &str) -> Request {
    Request::new(Method::GET, Url::parse(&format!("http://localhost{}", path)).unwrap())
}

/// Successful login envelope as the upstream sends it.
pub fn login_ok_body(token: &str, expires_in: f64) -> String {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": expires_in,
            "merchant_id": 206,
            "merchant_name": "Test Merchant"
        },
        "meta": {"timestamp": "2025-01-01T00:00:00Z", "version": "v1"}
    })
    .to_string()
}

/// One scripted reply of a [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub enum Step {
    Status(u16, &'static str),
    Owned(u16, String),
    /// transport level failure
    Fail,
    /// reply after `ms` milliseconds, unless the call context finishes first
    Slow(u64, u16, String),
}

/// What the transport received for one call.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Vec<u8>>,
}

type RouteFn = Box<dyn Fn(&Seen) -> Step + Send + Sync>;

enum Script {
    Steps(Vec<Step>),
    Routed(RouteFn),
}

/// In-memory transport replaying scripted replies. When the steps run out the
/// last one repeats.
pub struct ScriptedTransport {
    script: Script,
    calls: AtomicUsize,
    seen: Mutex<Vec<Seen>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        assert!(!steps.is_empty(), "at least one step");
        Self::with_script(Script::Steps(steps))
    }

    pub fn always(status: u16, body: &'static str) -> Self {
        Self::new(vec![Step::Status(status, body)])
    }

    /// Pick the reply from the incoming request.
    pub fn routed<F>(route: F) -> Self
    where
        F: Fn(&Seen) -> Step + Send + Sync + 'static,
    {
        Self::with_script(Script::Routed(Box::new(route)))
    }

    fn with_script(script: Script) -> Self {
        Self { script, calls: AtomicUsize::new(0), seen: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.seen().iter().filter(|s| s.path == path).count()
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        let seen = Seen {
            method: request.method().clone(),
            path: request.url().path().to_owned(),
            authorization: request
                .headers()
                .get(http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
        };
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = match &self.script {
            Script::Steps(steps) => steps[index.min(steps.len() - 1)].clone(),
            Script::Routed(route) => route(&seen),
        };
        self.seen.lock().unwrap().push(seen);

        match step {
            Step::Status(status, body) => Ok(response(status, body.to_owned())),
            Step::Owned(status, body) => Ok(response(status, body)),
            Step::Fail => Err(transport_error().into()),
            Step::Slow(ms, status, body) => {
                ctx.run(async {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(response(status, body))
                })
                .await
            }
        }
    }
}

fn response(status: u16, body: String) -> Response {
    let inner = http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    Response::from(inner)
}

/// A genuine `reqwest::Error`, produced by building a request with an invalid header name.
pub fn transport_error() -> reqwest::Error {
    Client::new()
        .get("http://localhost/")
        .header("bad header", "v")
        .build()
        .unwrap_err()
}
