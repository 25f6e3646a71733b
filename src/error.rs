use http::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by the upstream API, or a response that could not be decoded.
///
/// Carries everything needed to log the failure: upstream `error_code`, message,
/// HTTP status and the raw body as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
    pub http_status: StatusCode,
    pub raw_body: Vec<u8>,
}

impl ApiError {
    pub fn raw_body_lossy(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("list disbursement endpoint is not documented by the upstream API")]
    ListNotSupported,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status attached to the failure, if the upstream answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(api) => Some(api.http_status),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}
