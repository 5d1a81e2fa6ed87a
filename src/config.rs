use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the ingestion service, e.g. `https://ingest.example.com`.
    pub host: String,
    pub token: String,
    #[serde(with = "humantime_serde")]
    pub push_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: Option<String>,
}
impl CloudConfig {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.push_interval.is_zero() {
            return Err(ConfigError::ZeroPushInterval);
        }
        Ok(())
    }
    pub fn user_agent(&self) -> String {
        match &self.user_agent {
            Some(user_agent) => user_agent.clone(),
            None => format!("cloud-metrics/v{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            push_interval: DEFAULT_PUSH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
        }
    }
}
