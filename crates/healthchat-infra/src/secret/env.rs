//! Environment variable secret provider.
//!
//! The inference token is read from the process environment. A `.env` file
//! in the working directory (or any parent) is loaded first; variables that
//! are already set take precedence over the file.

use std::path::PathBuf;

use secrecy::SecretString;

use healthchat_types::error::ConfigError;

/// Read-only credential lookup backed by environment variables.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    /// Create a new environment variable secret provider.
    pub fn new() -> Self {
        Self
    }

    /// Load `.env` into the process environment, if one can be found.
    ///
    /// Returns the path of the file that was loaded.
    pub fn load_dotenv() -> Option<PathBuf> {
        match dotenv::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Some(path)
            }
            Err(e) => {
                tracing::debug!(error = %e, "No .env file loaded");
                None
            }
        }
    }

    /// Look up `key`. Unset, non-Unicode and blank values all count as absent.
    pub fn get(&self, key: &str) -> Option<SecretString> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
            Ok(_) => None,
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => None,
        }
    }

    /// Look up `key`, failing with [`ConfigError::MissingCredential`] when absent.
    pub fn require(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingCredential {
            name: key.to_string(),
        })
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}
