//! Access token state and the login flow that refreshes it.

pub mod token;
pub mod token_manager;

pub use token::AccessToken;
pub use token_manager::{Credentials, TokenManager};
