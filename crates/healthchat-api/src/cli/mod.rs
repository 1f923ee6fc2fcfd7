//! CLI command definitions for the `healthchat` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags select the
//! config file and override individual config values; subcommands pick the
//! UI driver (terminal chat, one-shot ask, or the web server).

pub mod ask;
pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use healthchat_types::config::AppConfig;

/// Ask general health questions. Not a substitute for a doctor.
#[derive(Parser)]
#[command(name = "healthchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors. Answers and UI output are unaffected.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file.
    #[arg(
        long,
        global = true,
        env = "HEALTHCHAT_CONFIG",
        default_value = "healthchat.toml"
    )]
    pub config: PathBuf,

    /// Model identifier, overriding `[provider] model`.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Prompt bundle path, overriding `[prompt] bundle_path`.
    #[arg(long, global = true, conflicts_with = "builtin_prompt")]
    pub prompt_bundle: Option<PathBuf>,

    /// Use the built-in prompt bundle instead of loading one from disk.
    #[arg(long, global = true)]
    pub builtin_prompt: bool,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans via OpenTelemetry (stdout exporter). Not
    /// available with `ask`, whose answer is written to stdout.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session in the terminal.
    Chat,

    /// Ask a single question and stream the answer to stdout.
    Ask {
        /// The question to ask.
        question: String,
    },

    /// Start the web UI and HTTP API.
    Serve {
        /// Port to listen on, overriding `[server] port`.
        #[arg(long)]
        port: Option<u16>,

        /// Host address to bind to, overriding `[server] host`.
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Reject flag combinations clap cannot express across subcommands.
    pub fn check_conflicts(&self) -> Result<(), String> {
        if self.otel && matches!(self.command, Commands::Ask { .. }) {
            return Err(
                "--otel writes spans to stdout and cannot be combined with `ask`".to_string(),
            );
        }
        Ok(())
    }

    /// Apply command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.provider.model = model.clone();
        }
        if let Some(path) = &self.prompt_bundle {
            config.prompt.bundle_path = path.clone();
        }
        if let Commands::Serve { port, host } = &self.command {
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(host) = host {
                config.server.host = host.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_ask() {
        let cli = Cli::try_parse_from(["healthchat", "ask", "What are symptoms of dehydration?"])
            .unwrap();
        match cli.command {
            Commands::Ask { question } => {
                assert_eq!(question, "What are symptoms of dehydration?");
            }
            _ => panic!("expected ask"),
        }
        assert_eq!(cli.config, PathBuf::from("healthchat.toml"));
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["healthchat", "chat", "-vv", "--builtin-prompt"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat));
        assert_eq!(cli.verbose, 2);
        assert!(cli.builtin_prompt);
    }

    #[test]
    fn test_cli_prompt_bundle_conflicts_with_builtin() {
        let result = Cli::try_parse_from([
            "healthchat",
            "chat",
            "--builtin-prompt",
            "--prompt-bundle",
            "x.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::try_parse_from([
            "healthchat",
            "--model",
            "HuggingFaceH4/zephyr-7b-beta",
            "--prompt-bundle",
            "custom.toml",
            "serve",
            "--port",
            "9000",
            "--host",
            "0.0.0.0",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.provider.model, "HuggingFaceH4/zephyr-7b-beta");
        assert_eq!(config.prompt.bundle_path, PathBuf::from("custom.toml"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_apply_overrides_leaves_unset_values() {
        let cli = Cli::try_parse_from(["healthchat", "serve"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_otel_rejected_with_ask() {
        let cli = Cli::try_parse_from(["healthchat", "--otel", "ask", "Is coffee ok?"]).unwrap();
        let err = cli.check_conflicts().unwrap_err();
        assert!(err.contains("--otel"));

        for args in [["healthchat", "--otel", "serve"], ["healthchat", "--otel", "chat"]] {
            assert!(Cli::try_parse_from(args).unwrap().check_conflicts().is_ok());
        }
        let plain = Cli::try_parse_from(["healthchat", "ask", "Is coffee ok?"]).unwrap();
        assert!(plain.check_conflicts().is_ok());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }
}
