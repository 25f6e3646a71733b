use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use crate::client::{CallContext, RequestExecutor};
use crate::error::{Error, Result};
use crate::services::TransferApi;
use crate::types::{CreateDisbursementRequest, DisbursementData, DisbursementStatusData, ListFilter};
use crate::utils::constants::{CHECK_STATUS_PATH, DISBURSEMENT_PATH};

pub struct TransferService<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> TransferService<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TransferApi for TransferService<'_> {
    async fn create_disbursement(
        &self,
        ctx: &CallContext,
        request: &CreateDisbursementRequest,
    ) -> Result<DisbursementData> {
        request.validate()?;
        let url = self.executor.endpoint(DISBURSEMENT_PATH)?;
        let response = self
            .executor
            .execute_json(ctx, Method::POST, url, request)
            .await?;
        let data: DisbursementData = self.executor.decode(ctx, response).await?;
        info!(
            "disbursement '{}' accepted as '{}' with status {}",
            request.reference_id,
            data.transaction_id,
            data.status.as_str()
        );
        Ok(data)
    }

    async fn get_disbursement_status(
        &self,
        ctx: &CallContext,
        transaction_id: &str,
    ) -> Result<DisbursementStatusData> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(Error::InvalidRequest("transaction id must not be empty".to_owned()));
        }
        let url = self
            .executor
            .endpoint_with_segment(CHECK_STATUS_PATH, transaction_id)?;
        let response = self.executor.execute(ctx, Method::GET, url).await?;
        self.executor.decode(ctx, response).await
    }

    async fn list_disbursements(
        &self,
        _ctx: &CallContext,
        _filter: &ListFilter,
    ) -> Result<Vec<DisbursementStatusData>> {
        Err(Error::ListNotSupported)
    }
}
