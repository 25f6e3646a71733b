use async_trait::async_trait;
use reqwest::Method;

use crate::client::{CallContext, RequestExecutor};
use crate::error::Result;
use crate::services::BalanceApi;
use crate::types::BalanceData;
use crate::utils::constants::BALANCE_PATH;

pub struct BalanceService<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> BalanceService<'a> {
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl BalanceApi for BalanceService<'_> {
    async fn get_balance(&self, ctx: &CallContext) -> Result<BalanceData> {
        let url = self.executor.endpoint(BALANCE_PATH)?;
        let response = self.executor.execute(ctx, Method::GET, url).await?;
        self.executor.decode(ctx, response).await
    }
}
