//! The prompt bundle: system prompt plus safety gate.
//!
//! Built once at startup and shared read-only (behind an `Arc`) by every
//! session for the lifetime of the process.

use healthchat_types::error::PromptBundleError;
use healthchat_types::prompt::PromptBundleFile;

use crate::safety::SafetyGate;

/// Persona and constraints used when no bundle file is loaded.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a friendly and careful general health information assistant.
Answer general health and wellness questions in clear, simple language.
Keep answers short: a few sentences or a brief list.
Never diagnose conditions, recommend specific medicines or doses, or \
suggest treatments.
When a question needs personal medical judgement, encourage the user to \
consult a qualified healthcare professional.
If a question describes an emergency, tell the user to contact local \
emergency services immediately.";

/// Immutable system prompt and safety predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBundle {
    system_prompt: String,
    safety_gate: SafetyGate,
}

impl PromptBundle {
    pub fn new(system_prompt: impl Into<String>, safety_gate: SafetyGate) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            safety_gate,
        }
    }

    /// The inline bundle: default prompt and default blocklist.
    pub fn builtin() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, SafetyGate::default())
    }

    /// Build a bundle from its serialized form.
    ///
    /// A missing `blocked_phrases` list falls back to the default blocklist.
    /// A blank system prompt is rejected.
    pub fn from_file(file: PromptBundleFile) -> Result<Self, PromptBundleError> {
        if file.system_prompt.trim().is_empty() {
            return Err(PromptBundleError::Malformed(
                "system_prompt is empty".to_string(),
            ));
        }

        let safety_gate = match file.blocked_phrases {
            Some(phrases) => SafetyGate::new(phrases),
            None => SafetyGate::default(),
        };

        Ok(Self::new(file.system_prompt, safety_gate))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn safety_gate(&self) -> &SafetyGate {
        &self.safety_gate
    }

    /// Shorthand for `self.safety_gate().is_unsafe(question)`.
    pub fn is_unsafe(&self, question: &str) -> bool {
        self.safety_gate.is_unsafe(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bundle() {
        let bundle = PromptBundle::builtin();
        assert_eq!(bundle.system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert!(bundle.is_unsafe("what dose of aspirin?"));
        assert!(!bundle.is_unsafe("is walking good exercise?"));
    }

    #[test]
    fn test_from_file_with_custom_phrases() {
        let bundle = PromptBundle::from_file(PromptBundleFile {
            system_prompt: "You are a nutrition helper.".to_string(),
            blocked_phrases: Some(vec!["Supplement".to_string()]),
        })
        .unwrap();

        assert_eq!(bundle.system_prompt(), "You are a nutrition helper.");
        assert!(bundle.is_unsafe("which supplement should I take"));
        assert!(!bundle.is_unsafe("what dosage?"));
    }

    #[test]
    fn test_from_file_defaults_phrases() {
        let bundle = PromptBundle::from_file(PromptBundleFile {
            system_prompt: "Be helpful.".to_string(),
            blocked_phrases: None,
        })
        .unwrap();
        assert_eq!(bundle.safety_gate(), &SafetyGate::default());
    }

    #[test]
    fn test_from_file_rejects_blank_prompt() {
        let err = PromptBundle::from_file(PromptBundleFile {
            system_prompt: "  \n".to_string(),
            blocked_phrases: None,
        })
        .unwrap_err();
        assert!(matches!(err, PromptBundleError::Malformed(_)));
    }
}
