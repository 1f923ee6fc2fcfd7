//! Chat sessions: the per-session transcript and the safety-gated
//! streaming chat service.

pub mod service;
pub mod transcript;
