//! Serialized form of the prompt bundle resource.

use serde::{Deserialize, Serialize};

/// On-disk prompt bundle (`prompts/health_prompt.toml`).
///
/// `blocked_phrases` is optional; when absent the built-in blocklist applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBundleFile {
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_phrases: Option<Vec<String>>,
}
