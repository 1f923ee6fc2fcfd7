//! Terminal markdown rendering.
//!
//! During streaming, fragments are printed raw. Once the answer is complete
//! the raw text is cleared and replaced with termimad-rendered markdown.

use std::io::Write;

use console::{Term, measure_text_width, style};
use termimad::MadSkin;
use termimad::crossterm::style::Color;

/// Terminal markdown renderer.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(Color::Cyan);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        skin.inline_code.set_fg(Color::Yellow);
        Self { skin }
    }

    /// Render a complete markdown answer.
    pub fn render_final(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Print a single streaming fragment (raw, no formatting).
    pub fn print_streaming_token(&self, token: &str) {
        print!("{token}");
        let _ = std::io::stdout().flush();
    }

    /// Replace `streamed` (already printed, cursor on the line below it)
    /// with `header` followed by `markdown` rendered.
    ///
    /// Leaves the raw text in place when stdout is not a terminal or the
    /// text has scrolled past the top of the screen.
    pub fn replace_streamed(&self, streamed: &str, header: &str, markdown: &str) {
        let term = Term::stdout();
        if !term.is_term() {
            return;
        }

        let (rows, cols) = term.size();
        let used = rows_used(streamed, cols as usize);
        if used == 0 || used >= rows as usize {
            return;
        }

        if term.clear_last_lines(used).is_err() {
            return;
        }
        println!("{header}");
        print!("{}", self.render_final(markdown));
        let _ = std::io::stdout().flush();
    }

    /// Print the footer after an answer: "| 1.4s . model".
    pub fn print_stats_footer(&self, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "  {} {:.1}s {} {}",
            style("|").dim(),
            style(seconds).dim(),
            style("\u{00b7}").dim(),
            style(model).dim(),
        );
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal rows occupied by `text` at `cols` columns, counting wraps.
fn rows_used(text: &str, cols: usize) -> usize {
    if cols == 0 {
        return 0;
    }
    text.split('\n')
        .map(|line| {
            let width = measure_text_width(line);
            width.div_ceil(cols).max(1)
        })
        .sum()
}
