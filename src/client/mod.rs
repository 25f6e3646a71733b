//! The client session: configuration, token state and transport chain, shared by
//! the endpoint services.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::services::{BalanceService, TransferService};

pub mod builder;
pub mod context;
pub mod executor;

pub use builder::ClientBuilder;
pub use context::CallContext;
pub use executor::RequestExecutor;

/// Cheap to clone; clones share the token state and the transport chain.
#[derive(Clone)]
pub struct PayaraClient {
    pub(crate) inner: Arc<RequestExecutor>,
}

impl PayaraClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.inner
    }

    pub fn balance(&self) -> BalanceService<'_> {
        BalanceService::new(&self.inner)
    }

    pub fn transfer(&self) -> TransferService<'_> {
        TransferService::new(&self.inner)
    }
}

impl std::fmt::Debug for PayaraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayaraClient").field("base_url", &self.base_url()).finish()
    }
}
