//! Prompt bundle loader.
//!
//! The bundle is a TOML resource holding the system prompt and, optionally,
//! the safety blocklist. Unlike the config file, a missing or broken bundle
//! is an error: the assistant must not run without its prompt.

use std::path::Path;

use healthchat_core::prompt::PromptBundle;
use healthchat_types::error::PromptBundleError;
use healthchat_types::prompt::PromptBundleFile;

/// Load and validate the prompt bundle at `path`.
pub async fn load_prompt_bundle(path: &Path) -> Result<PromptBundle, PromptBundleError> {
    let display = path.display().to_string();

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PromptBundleError::NotFound { path: display });
        }
        Err(err) => {
            return Err(PromptBundleError::Unreadable {
                path: display,
                reason: err.to_string(),
            });
        }
    };

    let file: PromptBundleFile = toml::from_str(&content)
        .map_err(|e| PromptBundleError::Malformed(format!("{display}: {e}")))?;

    let bundle = PromptBundle::from_file(file)?;
    tracing::info!(
        path = %path.display(),
        blocked_phrases = bundle.safety_gate().blocked_phrases().len(),
        "Loaded prompt bundle"
    );
    Ok(bundle)
}
