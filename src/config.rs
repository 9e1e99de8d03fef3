//! Runtime configuration for the call analyzer.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable holding the Groq API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
const MODEL_ENV: &str = "CALL_ANALYZER_MODEL";
const LLM_URL_ENV: &str = "CALL_ANALYZER_LLM_URL";
const TEMPERATURE_ENV: &str = "CALL_ANALYZER_TEMPERATURE";
const MAX_TOKENS_ENV: &str = "CALL_ANALYZER_MAX_TOKENS";
const LOG_PATH_ENV: &str = "CALL_ANALYZER_LOG_PATH";
const STATIC_DIR_ENV: &str = "CALL_ANALYZER_STATIC_DIR";
const PORT_ENV: &str = "CALL_ANALYZER_PORT";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat completion model name.
    pub model: String,
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response token budget.
    pub max_tokens: u32,
    /// API key; `None` when the secret is not configured.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            temperature: 0.3,
            max_tokens: 300,
            api_key: None,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion model settings.
    pub llm: LlmConfig,
    /// CSV file backing the analysis log.
    pub log_path: PathBuf,
    /// Directory served for everything outside the API routes.
    pub static_dir: PathBuf,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            log_path: PathBuf::from("call_analysis.csv"),
            static_dir: PathBuf::from("static"),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a value is malformed or validation fails.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.llm.api_key = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty());
        if let Some(model) = lookup(MODEL_ENV) {
            config.llm.model = model;
        }
        if let Some(base_url) = lookup(LLM_URL_ENV) {
            config.llm.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(temperature) = parse_env(&lookup, TEMPERATURE_ENV)? {
            config.llm.temperature = temperature;
        }
        if let Some(max_tokens) = parse_env(&lookup, MAX_TOKENS_ENV)? {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(path) = lookup(LOG_PATH_ENV) {
            config.log_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(STATIC_DIR_ENV) {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(port) = parse_env(&lookup, PORT_ENV)? {
            config.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid("llm.temperature must be within [0, 2]".to_string()));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid("llm.max_tokens must be > 0".to_string()));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }

        Url::parse(&self.llm.base_url)?;
        Ok(())
    }
}

fn parse_env<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidEnv { name, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!((config.llm.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.llm.max_tokens, 300);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.log_path, PathBuf::from("call_analysis.csv"));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_ENV, "gsk_test"),
            (MODEL_ENV, "llama-3.3-70b-versatile"),
            (LLM_URL_ENV, "http://localhost:8080/v1/"),
            (TEMPERATURE_ENV, "0"),
            (MAX_TOKENS_ENV, "128"),
            (PORT_ENV, "8081"),
        ]))
        .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
        assert_eq!(config.llm.max_tokens, 128);
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_rejects_malformed_values() {
        let err = AppConfig::from_lookup(lookup_from(&[(PORT_ENV, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: PORT_ENV, .. }));

        let err = AppConfig::from_lookup(lookup_from(&[(TEMPERATURE_ENV, "3.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_lookup(lookup_from(&[(MAX_TOKENS_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AppConfig::from_lookup(lookup_from(&[(LLM_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::Url(_)));
    }
}
