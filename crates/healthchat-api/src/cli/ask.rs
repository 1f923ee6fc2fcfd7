//! One-shot question: `healthchat ask "<question>"`.
//!
//! Streams the answer to stdout as it arrives. With `--json`, nothing is
//! streamed and the completed transcript is printed as JSON instead.

use std::io::Write;

use console::style;
use futures_util::StreamExt;

use healthchat_core::chat::transcript::Transcript;
use healthchat_types::error::ChatError;

use crate::state::AppState;

pub async fn ask(state: &AppState, question: String, json: bool) -> anyhow::Result<()> {
    let transcript = Transcript::shared();
    let mut fragments = state
        .chat_service
        .ask_in_session(transcript.clone(), question);

    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                if !json {
                    print!("{text}");
                    stdout.flush()?;
                }
            }
            Err(ChatError::InvalidInput(msg)) => {
                eprintln!("{} {msg}", style("!").yellow().bold());
                anyhow::bail!("no question given");
            }
            Err(e) => {
                if !json {
                    println!();
                }
                return Err(e.into());
            }
        }
    }

    if json {
        let transcript = transcript.lock().await;
        let output = serde_json::json!({
            "model": state.config.provider.model,
            "transcript": transcript.entries(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
    }

    Ok(())
}
