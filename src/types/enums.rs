use serde::{Deserialize, Serialize};

/// Disbursement lifecycle as reported by create and check-status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisbursementStatus {
    Process,
    Success,
    Failed,
}

impl DisbursementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisbursementStatus::Process => "PROCESS",
            DisbursementStatus::Success => "SUCCESS",
            DisbursementStatus::Failed => "FAILED",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, DisbursementStatus::Process)
    }
}

/// Merchant account status on the balance endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Suspended,
    Blocked,
}

/// Status carried by inbound callbacks. Note the capitalisation differs from
/// [`DisbursementStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackStatus {
    Success,
    Failed,
    Process,
}
