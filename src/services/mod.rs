//! Endpoint services built on the request executor.

use async_trait::async_trait;

use crate::client::CallContext;
use crate::error::Result;
use crate::types::{BalanceData, CreateDisbursementRequest, DisbursementData, DisbursementStatusData, ListFilter};

pub mod balance;
pub mod transfer;

pub use balance::BalanceService;
pub use transfer::TransferService;

#[async_trait]
pub trait BalanceApi: Send + Sync {
    /// `GET /api/v1/balance`
    async fn get_balance(&self, ctx: &CallContext) -> Result<BalanceData>;
}

#[async_trait]
pub trait TransferApi: Send + Sync {
    /// `POST /api/v1/disbursement`. The request is validated before any I/O.
    async fn create_disbursement(
        &self,
        ctx: &CallContext,
        request: &CreateDisbursementRequest,
    ) -> Result<DisbursementData>;

    /// `GET /api/v1/check-status/{transaction_id}`
    async fn get_disbursement_status(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
    ) -> Result<DisbursementStatusData>;

    /// Always fails with [`crate::Error::ListNotSupported`]; the upstream has no list endpoint.
    async fn list_disbursements(
        &self,
        ctx: &CallContext,
        filter: &ListFilter,
    ) -> Result<Vec<DisbursementStatusData>>;
}
