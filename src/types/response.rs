use serde::{Deserialize, Serialize};

use crate::types::decode::{flexible_i64, null_as_default, BalanceAmount, FlexString};
use crate::types::enums::{AccountStatus, CallbackStatus, DisbursementStatus};

/// `data` of a successful login.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_type: String,
    /// Seconds until expiry; the upstream sends fractional values.
    #[serde(default)]
    pub expires_in: f64,
    #[serde(default)]
    pub merchant_id: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant_name: String,
}

impl std::fmt::Debug for LoginData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginData")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("merchant_id", &self.merchant_id)
            .field("merchant_name", &self.merchant_name)
            .finish()
    }
}

/// `data` of `GET /api/v1/balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceData {
    pub merchant_id: FlexString,
    pub balance: BalanceAmount,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    pub status: AccountStatus,
}

/// `data` of `POST /api/v1/disbursement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementData {
    pub transaction_id: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference_id: String,
    #[serde(deserialize_with = "flexible_i64")]
    pub amount: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub fee: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub total_amount: i64,
    pub status: DisbursementStatus,
    #[serde(default)]
    pub bank_code: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

/// `data` of `GET /api/v1/check-status/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisbursementStatusData {
    pub transaction_id: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference_id: String,
    pub status: DisbursementStatus,
    #[serde(deserialize_with = "flexible_i64")]
    pub amount: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub fee: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub total_amount: i64,
    #[serde(default)]
    pub bank_code: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: FlexString,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
    /// Only present when `status` is `FAILED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Body the upstream POSTs to the merchant's callback URL.
///
/// Every field is optional at decode time so that missing required fields can be
/// reported as such instead of as malformed JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(default)]
    pub transaction_id: Option<FlexString>,
    #[serde(default)]
    pub amount: Option<FlexString>,
    #[serde(default)]
    pub status: Option<CallbackStatus>,
    #[serde(default)]
    pub reference_id: Option<FlexString>,
    #[serde(default)]
    pub admin_fee: Option<FlexString>,
    /// `true` marks the refund of a failed disbursement.
    #[serde(default)]
    pub is_refund: bool,
}

impl CallbackPayload {
    pub fn missing_required(&self) -> bool {
        let blank = |v: &Option<FlexString>| v.as_ref().map_or(true, |s| s.is_empty());
        blank(&self.transaction_id) || blank(&self.reference_id) || self.status.is_none()
    }
}
