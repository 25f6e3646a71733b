use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{CallbackServerConfig, ClientConfig, LoggingConfig, ServiceConfig};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let service_config = read_config(path).await?;
    validate(&service_config)?;
    Ok(service_config)
}

/// Read a YAML config with env expansion and defaults applied. Validation is
/// left to the caller so that overrides can be layered on first.
pub async fn read_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config '{}'", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_unvalidated(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let service_config = parse_unvalidated(content)?;
    validate(&service_config)?;
    Ok(service_config)
}

fn parse_unvalidated(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.logging.is_none() {
        service_config.logging = Some(LoggingConfig::default());
    }
    Ok(service_config)
}

pub fn validate(config: &ServiceConfig) -> Result<()> {
    debug!("validating config ...");
    validate_client(&config.client)?;
    validate_callback(config.callback.as_ref())
}

pub fn validate_client(client: &ClientConfig) -> Result<()> {
    if client.app_id.trim().is_empty() {
        bail!("client.app_id is required");
    }
    if client.app_secret.trim().is_empty() {
        bail!("client.app_secret is required");
    }
    let base_url = client.resolved_base_url();
    reqwest::Url::parse(&base_url).with_context(|| format!("client.base_url '{}' is not a valid URL", base_url))?;

    if let Some(retry) = &client.retry {
        if let (Some(initial), Some(max)) = (retry.initial_backoff_ms, retry.max_backoff_ms) {
            if max < initial {
                bail!("client.retry.max_backoff_ms ({}) must be >= initial_backoff_ms ({})", max, initial);
            }
        }
    }
    Ok(())
}

pub fn validate_callback(callback: Option<&CallbackServerConfig>) -> Result<()> {
    if let Some(callback) = callback {
        if !callback.path.starts_with('/') {
            bail!("callback.path '{}' must start with '/'", callback.path);
        }
    }
    Ok(())
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::Environment;
    use crate::config::settings::LogFormat;
    use serial_test::serial;
    use std::io::Write;

    const SAMPLE: &str = r#"
client:
  environment: sandbox
  app_id: ${PAYARA_TEST_APP_ID}
  app_secret: ${PAYARA_TEST_APP_SECRET:fallback-secret}
  timeout_ms: 5000
  log_requests: true
  retry:
    max_retries: 2
    initial_backoff_ms: 100
logging:
  level: debug
  format: json
callback:
  port: 9091
"#;

    #[test]
    #[serial]
    fn expands_env_and_defaults() {
        std::env::set_var("PAYARA_TEST_APP_ID", "app-123");
        std::env::remove_var("PAYARA_TEST_APP_SECRET");
        let expanded = expand_env_vars("id=${PAYARA_TEST_APP_ID} secret=${PAYARA_TEST_APP_SECRET:dflt} none=${PAYARA_TEST_MISSING}");
        assert_eq!(expanded, "id=app-123 secret=dflt none=");
        std::env::remove_var("PAYARA_TEST_APP_ID");
    }

    #[tokio::test]
    #[serial]
    async fn loads_yaml_file() {
        std::env::set_var("PAYARA_TEST_APP_ID", "app-123");
        std::env::remove_var("PAYARA_TEST_APP_SECRET");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = file_to_config(file.path()).await.unwrap();
        assert_eq!(config.client.environment, Environment::Sandbox);
        assert_eq!(config.client.app_id, "app-123");
        assert_eq!(config.client.app_secret, "fallback-secret");
        assert_eq!(config.client.resolved_base_url(), "https://sandbox.payara.id:9090");
        assert_eq!(config.client.timeout_ms(), 5000);
        assert!(config.client.log_requests);
        assert_eq!(config.client.retry.as_ref().unwrap().max_retries, Some(2));
        assert_eq!(config.client.retry.as_ref().unwrap().max_backoff_ms, None);

        let logging = config.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);

        let callback = config.callback.unwrap();
        assert_eq!(callback.port, 9091);
        assert_eq!(callback.path, "/payara/callback");
        std::env::remove_var("PAYARA_TEST_APP_ID");
    }

    #[test]
    fn base_url_override_wins_and_is_normalized() {
        let config = parse_config(
            "client:\n  environment: sandbox\n  base_url: http://localhost:9000/\n  app_id: a\n  app_secret: b\n",
        )
        .unwrap();
        assert_eq!(config.client.resolved_base_url(), "http://localhost:9000");
        assert_eq!(config.client.timeout_ms(), 30_000);
        assert!(config.logging.is_some());
    }

    #[tokio::test]
    async fn read_config_defers_validation_until_overrides_apply() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"client:\n  environment: sandbox\n").unwrap();

        assert!(file_to_config(file.path()).await.is_err());
        let mut config = read_config(file.path()).await.unwrap();
        assert!(validate(&config).is_err());
        assert!(validate_callback(config.callback.as_ref()).is_ok());

        config.client.app_id = "from-cli".into();
        config.client.app_secret = "from-env".into();
        validate(&config).unwrap();
    }

    #[test]
    fn rejects_missing_credentials_and_bad_backoff() {
        assert!(parse_config("client:\n  app_id: a\n").is_err());
        let err = parse_config(
            "client:\n  app_id: a\n  app_secret: b\n  retry:\n    initial_backoff_ms: 500\n    max_backoff_ms: 100\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_backoff_ms"));
    }
}
