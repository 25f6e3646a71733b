//! Shared constants and invariants

pub const SANDBOX_BASE_URL: &str = "https://sandbox.payara.id:9090";
pub const PRODUCTION_BASE_URL: &str = "https://openapi.payara.id:7654";

pub const LOGIN_PATH: &str = "/api/v1/login";
pub const BALANCE_PATH: &str = "/api/v1/balance";
pub const DISBURSEMENT_PATH: &str = "/api/v1/disbursement";
pub const CHECK_STATUS_PATH: &str = "/api/v1/check-status";

/// Tokens this close to expiry are treated as already expired.
pub const TOKEN_BUFFER_SECS: i64 = 5 * 60;
/// Used when login reports a non-positive `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: f64 = 3600.0;
/// Longer `expires_in` values are cut down to one year.
pub const MAX_TOKEN_TTL_SECS: f64 = 365.0 * 24.0 * 3600.0;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

pub const MIN_DISBURSEMENT_AMOUNT: i64 = 10_000;
pub const MAX_DISBURSEMENT_AMOUNT: i64 = 50_000_000;
