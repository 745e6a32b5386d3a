//! Process configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Configuration for the completion provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Gateway base URL; requests go to `<gateway>/openai/v1/chat/completions`
    pub gateway: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Upper bound on a single completion, enforced by the caller
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            gateway: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub resources_dir: PathBuf,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("MODEBOT_PORT"), "MODEBOT_PORT", DEFAULT_PORT)?;
        let temperature = parse_or(
            get("MODEBOT_TEMPERATURE"),
            "MODEBOT_TEMPERATURE",
            DEFAULT_TEMPERATURE,
        )?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                var: "MODEBOT_TEMPERATURE",
                value: temperature.to_string(),
            });
        }
        let timeout_secs: u64 = parse_or(
            get("MODEBOT_COMPLETION_TIMEOUT_SECS"),
            "MODEBOT_COMPLETION_TIMEOUT_SECS",
            DEFAULT_COMPLETION_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "MODEBOT_COMPLETION_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            port,
            resources_dir: get("MODEBOT_RESOURCES_DIR")
                .map_or_else(|| PathBuf::from("resources"), PathBuf::from),
            llm: LlmConfig {
                api_key: get("OPENAI_API_KEY"),
                gateway: get("LLM_GATEWAY"),
                model: get("MODEBOT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.resources_dir, PathBuf::from("resources"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!((config.llm.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.llm.timeout, Duration::from_secs(60));
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("MODEBOT_PORT", "9001"),
            ("MODEBOT_RESOURCES_DIR", "/srv/bot"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_GATEWAY", "http://gw.local/llm"),
            ("MODEBOT_MODEL", "gpt-4o"),
            ("MODEBOT_TEMPERATURE", "0.2"),
            ("MODEBOT_COMPLETION_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.resources_dir, PathBuf::from("/srv/bot"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.gateway.as_deref(), Some("http://gw.local/llm"));
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config(&[("OPENAI_API_KEY", "  "), ("MODEBOT_PORT", "")]).unwrap();
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("MODEBOT_PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                var: "MODEBOT_PORT",
                value: "eighty".to_string()
            }
        );
        assert!(config(&[("MODEBOT_TEMPERATURE", "3.5")]).is_err());
        assert!(config(&[("MODEBOT_COMPLETION_TIMEOUT_SECS", "0")]).is_err());
    }
}
