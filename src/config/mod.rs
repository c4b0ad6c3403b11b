pub mod loader;

use std::time::Duration;

pub use loader::load;
use serde::{Deserialize, Serialize};

use crate::core::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout. Unset means the transport default.
    pub timeout_ms: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total tries, including the first one.
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay_ms: 1000,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.delay_ms, 1000);
    }

    #[test]
    fn test_partial_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:3000"
            timeout_ms = 2500

            [retry]
            max_attempts = 2
            delay_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert_eq!(config.api.timeout_ms, Some(2500));
        assert_eq!(config.theme, ThemeConfig::default());

        let policy = RetryPolicy::from(config.retry);
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(policy.delay(), Duration::from_millis(10));
    }
}
