//! # Payara Client Library
//!
//! Async client for the Payara disbursement API. Handles the access token
//! lifecycle, sends requests through a composable transport chain (retry,
//! logging, metrics, tracing hooks) and decodes the loosely typed responses
//! into strict Rust types.
//!
//! Modules:
//! - `client`: client builder, call context and the authenticated request executor
//! - `auth`: access token state and the login flow
//! - `transport`: transport trait, middleware chain and the bundled middlewares
//! - `services`: balance and transfer endpoints
//! - `types`: wire model and tolerant decoders
//! - `callback`: receiver for upstream disbursement callbacks
//! - `config`: client and service configuration

pub mod auth;
pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod sandbox;
pub mod services;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::{CallContext, ClientBuilder, PayaraClient};
pub use crate::config::{ClientConfig, Environment};
pub use crate::error::{ApiError, Error, Result};
pub use crate::services::{BalanceApi, TransferApi};
pub use crate::transport::{Middleware, RetryPolicy, Transport};
pub use crate::types::*;
