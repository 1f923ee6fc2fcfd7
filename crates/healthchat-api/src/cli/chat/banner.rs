//! Welcome banner display for chat sessions.

use console::style;

pub const TITLE: &str = "\u{1fa7a} General Health Query Chatbot";

/// Print the welcome banner with the disclaimer, model and session id.
pub fn print_welcome_banner(model: &str, session_id: &str) {
    println!();
    println!("  {}", style(TITLE).cyan().bold());
    println!(
        "  {} {} {}",
        style("Ask general health-related questions. This chatbot does").dim(),
        style("not").bold(),
        style("replace a doctor.").dim()
    );
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
