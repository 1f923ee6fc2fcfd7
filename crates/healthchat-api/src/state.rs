//! Application state wiring the chat service to its dependencies.
//!
//! AppState is built once at startup and shared by every UI driver. The
//! chat service is pinned to a boxed provider so tests can swap in a mock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use healthchat_core::chat::service::ChatService;
use healthchat_core::chat::transcript::{SharedTranscript, Transcript};
use healthchat_core::llm::box_provider::BoxLlmProvider;
use healthchat_core::llm::provider::LlmProvider;
use healthchat_core::prompt::PromptBundle;
use healthchat_infra::config::load_app_config;
use healthchat_infra::llm::openai_compat::OpenAiCompatibleProvider;
use healthchat_infra::llm::openai_compat::config::OpenAiCompatConfig;
use healthchat_infra::prompt::load_prompt_bundle;
use healthchat_infra::secret::EnvSecretProvider;
use healthchat_types::config::AppConfig;

use crate::cli::Cli;

pub type ConcreteChatService = ChatService<BoxLlmProvider>;

/// A live web session: its transcript and when it was last touched.
pub struct WebSession {
    transcript: SharedTranscript,
    last_used: Instant,
}

impl WebSession {
    fn new() -> Self {
        Self {
            transcript: Transcript::shared(),
            last_used: Instant::now(),
        }
    }

    /// Held elsewhere, i.e. an answer or transcript read is in flight.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.transcript) > 1
    }
}

/// Shared application state.
///
/// Used by both CLI commands and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    /// Live web sessions. In memory only.
    pub sessions: Arc<DashMap<Uuid, WebSession>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Initialize from the command line: config, credential, prompt bundle,
    /// provider. Any failure here is fatal and happens before a UI starts.
    pub async fn init(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = load_app_config(&cli.config).await;
        cli.apply_overrides(&mut config);
        config.validate()?;

        let api_key = EnvSecretProvider::new().require(&config.provider.api_key_env)?;

        let bundle = if cli.builtin_prompt {
            info!("Using built-in prompt bundle");
            PromptBundle::builtin()
        } else {
            load_prompt_bundle(&config.prompt.bundle_path).await?
        };

        let provider = OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_provider_config(
            &config.provider,
            api_key,
        ))?;
        info!(
            provider = provider.name(),
            model = provider.model(),
            "Inference provider ready"
        );

        let chat_service = ChatService::new(
            Arc::new(bundle),
            BoxLlmProvider::new(provider),
            config.generation,
        );

        Ok(Self::new(chat_service, config))
    }

    pub fn new(chat_service: ConcreteChatService, config: AppConfig) -> Self {
        Self {
            chat_service: Arc::new(chat_service),
            sessions: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    /// Register a new, empty session and return its id.
    pub fn create_session(&self) -> Uuid {
        let id = Uuid::now_v7();
        self.sessions.insert(id, WebSession::new());
        id
    }

    /// Look up a session and mark it as used.
    pub fn session(&self, id: &Uuid) -> Option<SharedTranscript> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_used = Instant::now();
            entry.transcript.clone()
        })
    }

    /// Drop a session. Returns false if it did not exist.
    pub fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Discard sessions idle for at least `max_idle`. Sessions with work in
    /// flight are kept. Returns how many were removed.
    pub fn sweep_idle_sessions(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.in_use() || session.last_used.elapsed() < max_idle);
        before.saturating_sub(self.sessions.len())
    }

    /// Sweep idle sessions in the background for the life of the server.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        let max_idle = Duration::from_secs(self.config.server.session_idle_timeout_secs);
        let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = state.sweep_idle_sessions(max_idle);
                if removed > 0 {
                    info!(removed, remaining = state.sessions.len(), "Expired idle sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use healthchat_core::llm::provider::LlmEventStream;
    use healthchat_types::error::ConfigError;
    use healthchat_types::llm::{CompletionRequest, LlmError, StreamEvent};

    struct Silent;

    impl LlmProvider for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn model(&self) -> &str {
            "silent-model"
        }

        fn stream(&self, _request: CompletionRequest) -> LlmEventStream {
            Box::pin(futures_util::stream::iter(vec![Ok::<_, LlmError>(
                StreamEvent::Done,
            )]))
        }
    }

    fn state() -> AppState {
        let config = AppConfig::default();
        let service = ChatService::new(
            Arc::new(PromptBundle::builtin()),
            BoxLlmProvider::new(Silent),
            config.generation,
        );
        AppState::new(service, config)
    }

    #[test]
    fn test_create_lookup_remove_session() {
        let state = state();
        let id = state.create_session();
        assert!(state.session(&id).is_some());
        assert!(state.remove_session(&id));
        assert!(!state.remove_session(&id));
        assert!(state.session(&id).is_none());
    }

    #[test]
    fn test_sweep_discards_idle_sessions() {
        let state = state();
        state.create_session();
        state.create_session();

        assert_eq!(state.sweep_idle_sessions(Duration::from_secs(3600)), 0);
        assert_eq!(state.sessions.len(), 2);

        assert_eq!(state.sweep_idle_sessions(Duration::ZERO), 2);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_sweep_keeps_sessions_in_use() {
        let state = state();
        let busy = state.create_session();
        let idle = state.create_session();

        let transcript = state.session(&busy).unwrap();
        assert_eq!(state.sweep_idle_sessions(Duration::ZERO), 1);
        assert!(state.sessions.contains_key(&busy));
        assert!(!state.sessions.contains_key(&idle));

        drop(transcript);
        assert_eq!(state.sweep_idle_sessions(Duration::ZERO), 1);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_lookup_refreshes_last_used() {
        let state = state();
        let id = state.create_session();
        let created = state.sessions.get(&id).unwrap().last_used;

        std::thread::sleep(Duration::from_millis(5));
        state.session(&id).unwrap();
        assert!(state.sessions.get(&id).unwrap().last_used > created);
    }

    #[tokio::test]
    async fn test_sweeper_expires_sessions_in_background() {
        let mut config = AppConfig::default();
        config.server.session_idle_timeout_secs = 1;
        let service = ChatService::new(
            Arc::new(PromptBundle::builtin()),
            BoxLlmProvider::new(Silent),
            config.generation,
        );
        let state = AppState::new(service, config);
        let id = state.create_session();
        // Back-date the session; the sweeper's first tick fires immediately.
        state.sessions.get_mut(&id).unwrap().last_used =
            Instant::now().checked_sub(Duration::from_secs(2)).unwrap();

        let sweeper = state.spawn_session_sweeper();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(state.sessions.is_empty());
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_init_fails_without_credential() {
        let var = format!("HEALTHCHAT_TEST_UNSET_TOKEN_{}", Uuid::now_v7().simple());
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("healthchat.toml");
        std::fs::write(
            &config_path,
            format!("[provider]\napi_key_env = \"{var}\"\n"),
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "healthchat",
            "--config",
            config_path.to_str().unwrap(),
            "--builtin-prompt",
            "ask",
            "What is a fever?",
        ])
        .unwrap();

        let err = match AppState::init(&cli).await {
            Ok(_) => panic!("init succeeded without a credential"),
            Err(err) => err,
        };
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::MissingCredential { name }) => assert_eq!(name, &var),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
