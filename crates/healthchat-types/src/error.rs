use thiserror::Error;

use crate::llm::LlmError;

/// Errors raised while answering a single question.
///
/// These are recoverable: the UI reports them inline and the session
/// (including its transcript) carries on.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    Inference(#[from] LlmError),
}

/// Errors in process configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} not found. Add it to your environment or a .env file.")]
    MissingCredential { name: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors loading the prompt bundle resource. Fatal at startup.
#[derive(Debug, Error)]
pub enum PromptBundleError {
    #[error("prompt bundle not found at '{path}'")]
    NotFound { path: String },

    #[error("prompt bundle '{path}' could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("malformed prompt bundle: {0}")]
    Malformed(String),
}
