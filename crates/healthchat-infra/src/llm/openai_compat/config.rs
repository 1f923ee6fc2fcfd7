//! Configuration for the OpenAI-compatible inference provider.
//!
//! The Hugging Face inference router speaks the OpenAI chat completions
//! protocol, so the same provider serves it and any other compatible
//! endpoint via a configurable base URL.

use std::time::Duration;

use secrecy::SecretString;

use healthchat_types::config::ProviderConfig;

/// Configuration used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name, used in logs and spans.
    pub provider_name: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Bearer token.
    pub api_key: SecretString,
    /// Model identifier, e.g. `mistralai/Mistral-7B-Instruct-v0.2`.
    pub model: String,
    /// Overall timeout for a single HTTP request, including the streamed body.
    pub request_timeout: Duration,
}

impl OpenAiCompatConfig {
    /// Build from the `[provider]` section of the app config.
    ///
    /// The provider name is derived from the base URL: the Hugging Face
    /// router is reported as `huggingface`, anything else as `openai_compat`.
    pub fn from_provider_config(provider: &ProviderConfig, api_key: SecretString) -> Self {
        let provider_name = if provider.base_url.contains("huggingface.co") {
            "huggingface"
        } else {
            "openai_compat"
        };

        Self {
            provider_name: provider_name.into(),
            base_url: provider.base_url.clone(),
            api_key,
            model: provider.model.clone(),
            request_timeout: Duration::from_secs(provider.request_timeout_secs),
        }
    }
}
