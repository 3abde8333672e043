//! Error types for docmux.
//!
//! Library crates use [`DocmuxError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docmux operations.
#[derive(Debug, thiserror::Error)]
pub enum DocmuxError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during feed listing or archive download.
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected failure reading a docset index store.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid input (bad arguments, malformed feed listing, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Docset archive could not be unpacked.
    #[error("archive error: {0}")]
    Archive(String),

    /// The interactive selector binary could not be started.
    #[error("selector `{command}` is not installed or not on PATH")]
    SelectorUnavailable { command: String },

    /// The selector ran but exited abnormally.
    #[error("selector error: {0}")]
    Selector(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocmuxError>;

impl DocmuxError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
