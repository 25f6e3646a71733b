//! Client and service configuration: YAML model, environment selection and loader.

pub mod environment;
pub mod loader;
pub mod settings;

pub use environment::Environment;
pub use settings::{CallbackServerConfig, ClientConfig, LogFormat, LoggingConfig, RetryConfig, ServiceConfig};
