//! Configuration types for HealthChat.
//!
//! `AppConfig` mirrors `healthchat.toml`. Every section and field has a
//! default, so an empty or missing file yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration loaded from `healthchat.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Reject values the backend or server could never accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url is empty".to_string()));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.model is empty".to_string()));
        }
        if self.provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "provider.api_key_env is empty".to_string(),
            ));
        }
        if self.provider.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.server.session_idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.session_idle_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.generation.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "generation.max_tokens must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Invalid(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }
        Ok(())
    }
}

/// Inference backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Whole-request timeout applied by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_api_key_env() -> String {
    "HF_TOKEN".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Sampling parameters, fixed by policy for short advisory answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f64 {
    0.6
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Where the prompt bundle resource lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,
}

fn default_bundle_path() -> PathBuf {
    PathBuf::from("prompts/health_prompt.toml")
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Web sessions untouched for this long are discarded.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_session_idle_timeout_secs() -> u64 {
    30 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.provider.model, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.provider.api_key_env, "HF_TOKEN");
        assert_eq!(config.generation.max_tokens, 200);
        assert!((config.generation.temperature - 0.6).abs() < f64::EPSILON);
        assert_eq!(
            config.prompt.bundle_path,
            PathBuf::from("prompts/health_prompt.toml")
        );
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.session_idle_timeout_secs, 1800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_app_config_deserialize_partial_section() {
        let toml_str = r#"
[provider]
model = "meta-llama/Llama-3.1-8B-Instruct"

[generation]
temperature = 0.2
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.provider.base_url, "https://router.huggingface.co/v1");
        assert_eq!(config.generation.max_tokens, 200);
        assert!((config.generation.temperature - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_max_tokens() {
        let mut config = AppConfig::default();
        config.generation.max_tokens = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = AppConfig::default();
        config.generation.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validate_rejects_zero_session_timeout() {
        let mut config = AppConfig::default();
        config.server.session_idle_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session_idle_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_blank_credential_name() {
        let mut config = AppConfig::default();
        config.provider.api_key_env = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
