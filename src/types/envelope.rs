use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Error, Result};
use crate::types::decode::null_as_default;

/// Optional response metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Seconds to wait, sent alongside 429 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// The `{success, message, data, meta}` wrapper around every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Documented error body: `{success:false, message, error_code}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Classify a raw response. Decode failures, non-2xx statuses and
    /// `success: false` all become an [`ApiError`] carrying the raw body.
    pub fn decode(status: StatusCode, raw: &[u8]) -> Result<Envelope<T>> {
        let envelope = match serde_json::from_slice::<Envelope<T>>(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Err(api_error(status, raw, || format!("failed to decode response: {}", e)))
            }
        };
        if !status.is_success() {
            return Err(api_error(status, raw, || status.to_string()));
        }
        if !envelope.success {
            return Err(api_error(status, raw, || "request was not successful".to_owned()));
        }
        Ok(envelope)
    }

    /// Like [`Envelope::decode`] but also requires `data` to be present.
    pub fn decode_data(status: StatusCode, raw: &[u8]) -> Result<T> {
        let envelope = Self::decode(status, raw)?;
        envelope
            .data
            .ok_or_else(|| api_error(status, raw, || "response carries no data".to_owned()))
    }
}

/// Best-effort parse of an error-shaped body. `fallback` supplies the message when
/// the body does not carry one.
pub fn api_error(status: StatusCode, raw: &[u8], fallback: impl FnOnce() -> String) -> Error {
    let parsed: ErrorResponse = serde_json::from_slice(raw).unwrap_or_default();
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(fallback);
    Error::Api(ApiError {
        code: parsed.error_code.filter(|c| !c.is_empty()),
        message,
        http_status: status,
        raw_body: raw.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::response::BalanceData;
    use serde_json::json;

    fn bytes(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    #[test]
    fn decodes_success_envelope_with_meta() {
        let raw = bytes(json!({
            "success": true,
            "message": "ok",
            "data": {"merchant_id": 7, "balance": "1.000", "currency": "IDR",
                     "last_updated": "2024-01-01T00:00:00Z", "status": "ACTIVE"},
            "meta": {"timestamp": "2024-01-01T00:00:00Z", "version": "1.0"}
        }));
        let env = Envelope::<BalanceData>::decode(StatusCode::OK, &raw).unwrap();
        assert_eq!(env.meta.unwrap().version.as_deref(), Some("1.0"));
        assert_eq!(env.data.unwrap().balance.value(), 1000);
    }

    #[test]
    fn null_message_decodes_as_empty() {
        let raw = bytes(json!({
            "success": true,
            "message": null,
            "data": {"merchant_id": "206", "balance": 5000, "currency": "IDR",
                     "last_updated": "2024-01-01T00:00:00Z", "status": "ACTIVE"}
        }));
        let env = Envelope::<BalanceData>::decode(StatusCode::OK, &raw).unwrap();
        assert_eq!(env.message, "");
        let data = Envelope::<BalanceData>::decode_data(StatusCode::OK, &raw).unwrap();
        assert_eq!(data.balance.value(), 5000);
    }

    #[test]
    fn business_failure_carries_code_and_status() {
        let raw = bytes(json!({"success": false, "message": "Insufficient balance", "error_code": "INSUFFICIENT_BALANCE"}));
        let err = Envelope::<serde_json::Value>::decode(StatusCode::OK, &raw).unwrap_err();
        let api = err.api().unwrap();
        assert_eq!(api.code.as_deref(), Some("INSUFFICIENT_BALANCE"));
        assert_eq!(api.message, "Insufficient balance");
        assert_eq!(api.http_status, StatusCode::OK);
        assert_eq!(api.raw_body, raw);
    }

    #[test]
    fn non_2xx_fails_even_when_envelope_decodes() {
        let raw = bytes(json!({"success": true, "message": "weird", "data": null}));
        let err = Envelope::<serde_json::Value>::decode(StatusCode::BAD_GATEWAY, &raw).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(err.api().unwrap().message, "weird");
    }

    #[test]
    fn malformed_body_becomes_api_error_with_raw_body() {
        let raw = b"<html>bad gateway</html>".to_vec();
        let err = Envelope::<serde_json::Value>::decode(StatusCode::OK, &raw).unwrap_err();
        let api = err.api().unwrap();
        assert!(api.code.is_none());
        assert!(api.message.starts_with("failed to decode response"));
        assert_eq!(api.raw_body_lossy(), "<html>bad gateway</html>");
    }

    #[test]
    fn missing_data_is_an_error_for_decode_data() {
        let raw = bytes(json!({"success": true, "message": "ok"}));
        let err = Envelope::<BalanceData>::decode_data(StatusCode::OK, &raw).unwrap_err();
        assert_eq!(err.api().unwrap().message, "ok");
    }
}
