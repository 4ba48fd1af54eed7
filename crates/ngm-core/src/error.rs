//! Core error types for ngm-core

use std::io;
use thiserror::Error;

/// Errors raised by the shared TUI plumbing
#[derive(Debug, Error)]
pub enum CoreError {
    /// A theme name that is not built in.
    #[error("unknown theme '{0}' (expected one of: frappe, dark, light, nord)")]
    UnknownTheme(String),

    /// A theme file could not be parsed.
    #[error("invalid theme: {0}")]
    InvalidTheme(#[from] toml::de::Error),

    /// Underlying IO error bubbled up from the terminal or filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
