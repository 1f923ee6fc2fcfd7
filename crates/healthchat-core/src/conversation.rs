//! Conversation assembly.
//!
//! Every question is sent to the model on its own: a system message with the
//! bundle's prompt followed by the user's question. No transcript history is
//! ever included.

use healthchat_types::config::GenerationConfig;
use healthchat_types::error::ChatError;
use healthchat_types::llm::{CompletionRequest, Message};

/// Exactly two messages, system first and user second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    system: Message,
    user: Message,
}

impl Conversation {
    /// Turn the conversation into a streaming completion request.
    pub fn into_request(self, model: &str, generation: &GenerationConfig) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![self.system, self.user],
            max_tokens: generation.max_tokens,
            temperature: Some(generation.temperature),
            stream: true,
        }
    }
}

/// Build the `[system, user]` pair for one question.
///
/// The question is passed through verbatim (no trimming). Blank questions
/// are rejected with [`ChatError::InvalidInput`].
pub fn build_conversation(system_prompt: &str, question: &str) -> Result<Conversation, ChatError> {
    if question.trim().is_empty() {
        return Err(ChatError::InvalidInput(
            "Please enter a question.".to_string(),
        ));
    }

    Ok(Conversation {
        system: Message::system(system_prompt),
        user: Message::user(question),
    })
}
