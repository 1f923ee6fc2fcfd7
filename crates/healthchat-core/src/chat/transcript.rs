//! Session transcript.
//!
//! Append-only, and only in whole exchanges: a user entry is always
//! immediately followed by the assistant entry that answered it.

use std::sync::Arc;

use tokio::sync::Mutex;

use healthchat_types::chat::{TranscriptEntry, TranscriptRole};

/// A transcript shared between a UI driver and the chat service.
///
/// The chat service holds the lock for the whole of an exchange, so two
/// questions in the same session never interleave.
pub type SharedTranscript = Arc<Mutex<Transcript>>;

/// Ordered record of one session's questions and answers.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh, empty transcript ready to be shared.
    pub fn shared() -> SharedTranscript {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Append a completed exchange.
    pub fn record_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries
            .push(TranscriptEntry::new(TranscriptRole::User, question));
        self.entries
            .push(TranscriptEntry::new(TranscriptRole::Assistant, answer));
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of completed question/answer pairs.
    pub fn exchange_count(&self) -> usize {
        self.entries.len() / 2
    }

    /// The most recent assistant answer, if any.
    pub fn last_answer(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.role == TranscriptRole::Assistant)
            .map(|e| e.content.as_str())
    }
}
