//! Main chat loop orchestration.
//!
//! Banner, input loop, slash commands and one streamed answer per question.
//! The session transcript lives only as long as the loop (or until `/new`).

use std::io::Write;
use std::time::{Duration, Instant};

use console::style;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use uuid::Uuid;

use healthchat_core::chat::transcript::{SharedTranscript, Transcript};
use healthchat_core::llm::provider::LlmProvider;
use healthchat_types::chat::TranscriptRole;
use healthchat_types::error::ChatError;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

const ASSISTANT_LABEL: &str = "Assistant";

/// Run the interactive chat loop until Ctrl+D or `/exit`.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let model = state.chat_service.provider().model().to_string();
    let mut session_id = Uuid::now_v7();
    let mut transcript = Transcript::shared();

    print_welcome_banner(&model, &session_id.to_string());
    info!(session_id = %session_id, "Chat session started");

    let renderer = ChatRenderer::new();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep asking.").dim()
                );
            }
            InputEvent::Message(text) => {
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::New => {
                            transcript = Transcript::shared();
                            session_id = Uuid::now_v7();
                            info!(session_id = %session_id, "Started new chat session");
                            println!(
                                "\n  {} New session {}\n",
                                style("*").cyan().bold(),
                                style(&session_id.to_string()[..8]).dim()
                            );
                        }
                        ChatCommand::History => print_history(&transcript).await,
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                answer_question(state, &renderer, &model, transcript.clone(), text).await;
            }
        }
    }

    Ok(())
}

/// Stream one answer to the terminal.
///
/// Errors are reported inline; the loop and the transcript carry on.
async fn answer_question(
    state: &AppState,
    renderer: &ChatRenderer,
    model: &str,
    transcript: SharedTranscript,
    question: String,
) {
    let spinner = thinking_spinner();
    let start_time = Instant::now();
    let mut fragments = state.chat_service.ask_in_session(transcript, question);

    let mut streamed = String::new();
    let mut answer = String::new();
    let mut first_fragment_received = false;

    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                if !first_fragment_received {
                    spinner.finish_and_clear();
                    first_fragment_received = true;
                    print!("\n  {} ", style(ASSISTANT_LABEL).cyan().bold());
                    let _ = std::io::stdout().flush();
                    streamed.push_str(&format!("  {ASSISTANT_LABEL} "));
                }
                renderer.print_streaming_token(&text);
                streamed.push_str(&text);
                answer.push_str(&text);
            }
            Err(ChatError::InvalidInput(msg)) => {
                spinner.finish_and_clear();
                println!("  {} {msg}", style("!").yellow().bold());
                return;
            }
            Err(e) => {
                spinner.finish_and_clear();
                eprintln!("\n  {} {e}", style("!").red().bold());
                eprintln!(
                    "  {}",
                    style("Ask again to retry, /exit to quit.").dim()
                );
                return;
            }
        }
    }

    if !first_fragment_received {
        spinner.finish_and_clear();
        return;
    }

    println!();
    let header = format!("  {}", style(ASSISTANT_LABEL).cyan().bold());
    renderer.replace_streamed(&streamed, &header, &answer);
    renderer.print_stats_footer(start_time.elapsed().as_millis() as u64, model);
    println!();
}

async fn print_history(transcript: &SharedTranscript) {
    let transcript = transcript.lock().await;
    println!();
    if transcript.is_empty() {
        println!("  {}", style("No questions asked yet.").dim());
    }
    for entry in transcript.entries() {
        let label = match entry.role {
            TranscriptRole::User => style("You").green().bold(),
            TranscriptRole::Assistant => style(ASSISTANT_LABEL).cyan().bold(),
        };
        println!("  {label} {}", preview(&entry.content, 100));
    }
    println!();
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// First `max_chars` characters of `text` on one line, with an ellipsis if cut.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
