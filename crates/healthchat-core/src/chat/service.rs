//! Safety-gated streaming chat service.
//!
//! `ask` is the whole per-question pipeline:
//!
//! 1. blank question -> one `InvalidInput` error, no backend call
//! 2. safety gate fires -> exactly one fragment, the canned refusal
//! 3. otherwise -> `[system, user]` conversation, one streaming completion,
//!    every fragment relayed as it arrives
//!
//! `ask_in_session` runs the same pipeline and, once the stream completes
//! without error, appends the exchange to the session transcript.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use healthchat_types::config::GenerationConfig;
use healthchat_types::error::ChatError;

use crate::conversation::build_conversation;
use crate::llm::provider::LlmProvider;
use crate::llm::stream::stream_completion;
use crate::prompt::PromptBundle;
use crate::safety::REFUSAL_MESSAGE;

use super::transcript::SharedTranscript;

/// Lazy sequence of answer fragments for one question.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// Answers questions through a provider, guarded by the bundle's safety gate.
///
/// Holds no per-session state; transcripts are passed in by the caller.
pub struct ChatService<P> {
    bundle: Arc<PromptBundle>,
    provider: P,
    generation: GenerationConfig,
}

impl<P: LlmProvider> ChatService<P> {
    pub fn new(bundle: Arc<PromptBundle>, provider: P, generation: GenerationConfig) -> Self {
        Self {
            bundle,
            provider,
            generation,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Stream the answer to `question`.
    pub fn ask(&self, question: &str) -> FragmentStream {
        if question.trim().is_empty() {
            debug!("Rejecting blank question");
            return single(Err(ChatError::InvalidInput(
                "Please enter a question.".to_string(),
            )));
        }

        if let Some(phrase) = self.bundle.safety_gate().matched_phrase(question) {
            info!(phrase, "Safety gate triggered, returning refusal");
            return single(Ok(REFUSAL_MESSAGE.to_string()));
        }

        let conversation = match build_conversation(self.bundle.system_prompt(), question) {
            Ok(conversation) => conversation,
            Err(e) => return single(Err(e)),
        };

        let fragments = stream_completion(&self.provider, conversation, &self.generation);
        Box::pin(fragments.map(|fragment| fragment.map_err(ChatError::from)))
    }

    /// Stream the answer to `question` and record the exchange in `transcript`.
    ///
    /// The transcript lock is taken when the stream is first polled and held
    /// until it finishes. The exchange is appended only if every fragment
    /// arrived; on error the transcript keeps its earlier history and the
    /// failed question is not recorded.
    pub fn ask_in_session(&self, transcript: SharedTranscript, question: String) -> FragmentStream {
        let fragments = self.ask(&question);

        Box::pin(async_stream::stream! {
            let mut transcript = transcript.lock_owned().await;
            let mut fragments = fragments;
            let mut answer = String::new();

            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(text) => {
                        answer.push_str(&text);
                        yield Ok(text);
                    }
                    Err(e) => {
                        if matches!(e, ChatError::Inference(_)) {
                            warn!(error = %e, "Answer failed, exchange not recorded");
                        }
                        yield Err(e);
                        return;
                    }
                }
            }

            transcript.record_exchange(question, answer);
            debug!(exchanges = transcript.exchange_count(), "Exchange recorded");
        })
    }
}

fn single(item: Result<String, ChatError>) -> FragmentStream {
    Box::pin(futures_util::stream::once(async move { item }))
}
