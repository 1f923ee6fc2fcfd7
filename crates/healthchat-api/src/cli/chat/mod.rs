//! Interactive terminal chat for HealthChat.
//!
//! Streams answers token by token behind a thinking spinner, re-renders the
//! finished answer as markdown, and handles slash commands. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
