//! Credential resolution.

pub mod env;

pub use env::EnvSecretProvider;
