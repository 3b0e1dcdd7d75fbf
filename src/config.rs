//! Run configuration.
//!
//! Settings are read once per run and then handed explicitly to the provider
//! and the crews; nothing in the library reads the environment on its own
//! after [`Settings::from_env`] returns.
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::llm::provider::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("Temperature must be within 0.0..=2.0, got {0}")]
    InvalidTemperature(f64),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Credentials and generation parameters for the LLM provider.
#[derive(Clone, Serialize)]
pub struct LlmConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub llm: LlmConfig,
    /// Where finished crew runs are exported as JSON, if anywhere.
    pub metadata_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let base_url = get("OPENAI_BASE_URL")
            .or_else(|| get("OPENAI_API_BASE"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let model = get("OPENAI_MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let temperature = match get("LLM_TEMPERATURE") {
            Some(value) => value
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "LLM_TEMPERATURE",
                    value,
                })?,
            None => DEFAULT_TEMPERATURE,
        };
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidTemperature(temperature));
        }

        let max_tokens = match get("LLM_MAX_TOKENS") {
            Some(value) => match value.parse::<u32>() {
                Ok(max_tokens) if max_tokens > 0 => Some(max_tokens),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "LLM_MAX_TOKENS",
                        value,
                    });
                }
            },
            None => None,
        };

        let verbose = match get("CREW_VERBOSE") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                var: "CREW_VERBOSE",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            llm: LlmConfig {
                api_key,
                base_url,
                model,
                temperature,
                max_tokens,
            },
            metadata_dir: get("CREW_METADATA_DIR").map(PathBuf::from),
            verbose,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(settings.llm.api_key, "sk-test");
        assert_eq!(settings.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.llm.model, DEFAULT_MODEL);
        assert_eq!(settings.llm.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.llm.max_tokens, None);
        assert!(settings.metadata_dir.is_none());
        assert!(!settings.verbose);
    }

    #[test]
    fn test_missing_or_blank_api_key() {
        assert_eq!(settings(&[]).unwrap_err(), ConfigError::MissingApiKey);
        assert_eq!(
            settings(&[("OPENAI_API_KEY", "   ")]).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:11434/v1"),
            ("OPENAI_MODEL_NAME", "llama3"),
            ("LLM_TEMPERATURE", "0.2"),
            ("LLM_MAX_TOKENS", "512"),
            ("CREW_METADATA_DIR", "./temp/crews"),
            ("CREW_VERBOSE", "yes"),
        ])
        .unwrap();
        assert_eq!(settings.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.llm.model, "llama3");
        assert_eq!(settings.llm.temperature, 0.2);
        assert_eq!(settings.llm.max_tokens, Some(512));
        assert_eq!(settings.metadata_dir, Some(PathBuf::from("./temp/crews")));
        assert!(settings.verbose);
    }

    #[test]
    fn test_base_url_takes_precedence() {
        let settings = settings(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://a/v1"),
            ("OPENAI_API_BASE", "http://b/v1"),
        ])
        .unwrap();
        assert_eq!(settings.llm.base_url, "http://a/v1");
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            settings(&[("OPENAI_API_KEY", "sk"), ("LLM_TEMPERATURE", "3.5")]).unwrap_err(),
            ConfigError::InvalidTemperature(3.5)
        );
        assert!(matches!(
            settings(&[("OPENAI_API_KEY", "sk"), ("LLM_TEMPERATURE", "warm")]),
            Err(ConfigError::InvalidValue {
                var: "LLM_TEMPERATURE",
                ..
            })
        ));
        assert!(matches!(
            settings(&[("OPENAI_API_KEY", "sk"), ("LLM_MAX_TOKENS", "0")]),
            Err(ConfigError::InvalidValue {
                var: "LLM_MAX_TOKENS",
                ..
            })
        ));
        assert!(matches!(
            settings(&[("OPENAI_API_KEY", "sk"), ("CREW_VERBOSE", "maybe")]),
            Err(ConfigError::InvalidValue {
                var: "CREW_VERBOSE",
                ..
            })
        ));
    }

    #[test]
    fn test_max_tokens_must_fit_provider_range() {
        assert!(matches!(
            settings(&[("OPENAI_API_KEY", "sk"), ("LLM_MAX_TOKENS", "4294967296")]),
            Err(ConfigError::InvalidValue {
                var: "LLM_MAX_TOKENS",
                ..
            })
        ));
        let settings = settings(&[("OPENAI_API_KEY", "sk"), ("LLM_MAX_TOKENS", "4294967295")])
            .unwrap();
        assert_eq!(settings.llm.max_tokens, Some(u32::MAX));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = settings(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }
}
