//! Error types for the Compass navigation journal.

use std::io;

/// Errors produced by the navigation journal engine.
///
/// Usage errors a caller can correct (navigating back with nothing
/// navigable behind, iterating a stack whose journal mutated) are
/// reported through this enum. Index-invariant violations are
/// programming errors and panic instead.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("no navigable entry behind the current position")]
    NoBackEntry,

    #[error("no navigable entry ahead of the current position")]
    NoForwardEntry,

    #[error("journal mutated during enumeration (version {version})")]
    JournalMutated { version: u64 },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("state error: {0}")]
    State(String),

    #[error("locator error: {0}")]
    Locator(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NavError>;
