use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::enums::DisbursementStatus;
use crate::utils::constants::{MAX_DISBURSEMENT_AMOUNT, MIN_DISBURSEMENT_AMOUNT};

/// Body of `POST /api/v1/login`: username is the app id, password the app secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /api/v1/disbursement`.
///
/// `reference_id` is the caller's idempotency key; the upstream rejects duplicates.
/// `amount` is in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDisbursementRequest {
    pub reference_id: String,
    pub amount: i64,
    pub bank_code: String,
    pub account_number: String,
    pub account_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateDisbursementRequest {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DISBURSEMENT_AMOUNT..=MAX_DISBURSEMENT_AMOUNT).contains(&self.amount) {
            return Err(Error::InvalidRequest(format!(
                "amount {} outside allowed range {}..={}",
                self.amount, MIN_DISBURSEMENT_AMOUNT, MAX_DISBURSEMENT_AMOUNT
            )));
        }
        let required = [
            ("reference_id", &self.reference_id),
            ("bank_code", &self.bank_code),
            ("account_number", &self.account_number),
            ("account_name", &self.account_name),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidRequest(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Filter for listing disbursements. The upstream documents no list endpoint, so
/// this only exists to keep the operation's signature stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub reference_id: Option<String>,
    pub status: Option<DisbursementStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
