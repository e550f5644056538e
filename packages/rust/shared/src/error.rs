//! Error types for pageforge.
//!
//! Library crates use [`PageForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all pageforge operations.
#[derive(Debug, thiserror::Error)]
pub enum PageForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A file could not be read.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A page, directory or config file could not be written.
    #[error("cannot write output {path:?}: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Request or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Invalid user input (unknown template type, empty document, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Template loading error.
    #[error("template error: {0}")]
    Template(String),

    /// HTTP server error.
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageForgeError>;

impl PageForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Wrap a `std::io::Error` raised while writing to `path`.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the input document itself could not be read.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}
