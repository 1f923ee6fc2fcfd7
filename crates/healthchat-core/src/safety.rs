//! Keyword blocklist safety gate.
//!
//! A question is unsafe when its lowercased text contains any blocked phrase
//! as a plain substring. There is no tokenization, stemming or fuzzy
//! matching, so a paraphrase walks straight past the gate.

/// Phrases that mark a question as asking for treatment or prescriptions.
pub const DEFAULT_BLOCKED_PHRASES: &[&str] = &[
    "dosage",
    "dose",
    "prescription",
    "how much medicine",
    "treatment for cancer",
    "suicide",
    "self harm",
];

/// Canned reply emitted in place of a model answer when the gate fires.
pub const REFUSAL_MESSAGE: &str = "\u{26a0}\u{fe0f} I can't provide medical treatment or prescriptions. Please consult a qualified healthcare professional.";

/// Case-insensitive substring blocklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyGate {
    /// Stored lowercased.
    blocked_phrases: Vec<String>,
}

impl SafetyGate {
    /// Build a gate from arbitrary phrases.
    ///
    /// Phrases are lowercased so that matching stays case-insensitive on both
    /// sides. Empty phrases are dropped: an empty needle would match every
    /// question.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blocked_phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { blocked_phrases }
    }

    pub fn blocked_phrases(&self) -> &[String] {
        &self.blocked_phrases
    }

    /// The first blocked phrase found in `question`, if any.
    pub fn matched_phrase(&self, question: &str) -> Option<&str> {
        let lowered = question.to_lowercase();
        self.blocked_phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// Whether `question` must be refused without consulting the model.
    ///
    /// Blank input is considered safe; rejecting it is the caller's job.
    pub fn is_unsafe(&self, question: &str) -> bool {
        self.matched_phrase(question).is_some()
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_PHRASES)
    }
}
