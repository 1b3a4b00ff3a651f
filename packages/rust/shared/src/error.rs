//! Error types for BuyerScope.
//!
//! Library crates use [`BuyerScopeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all BuyerScope operations.
#[derive(Debug, thiserror::Error)]
pub enum BuyerScopeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Directory search failure (the people-directory collaborator).
    #[error("directory error: {0}")]
    Directory(String),

    /// Profile collection or contact verification failure.
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// Reasoning service failure (availability probe passed but a call failed).
    #[error("reasoning error: {0}")]
    Reasoning(String),

    /// Candidate record parsing error (malformed JSONL, bad field shapes).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (range violations, inconsistent constraints).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A pipeline stage failed; the stage name attributes the failure.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<BuyerScopeError>,
    },

    /// The run was cancelled between stages.
    #[error("run cancelled after stage '{last_completed}'")]
    Cancelled { last_completed: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BuyerScopeError>;

impl BuyerScopeError {
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

    /// Attribute an error to a named pipeline stage.
    pub fn stage(stage: impl Into<String>, source: BuyerScopeError) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BuyerScopeError::config("deal_size must be positive");
        assert_eq!(err.to_string(), "config error: deal_size must be positive");

        let err = BuyerScopeError::validation("ideal exceeds max");
        assert!(err.to_string().contains("ideal exceeds max"));
    }

    #[test]
    fn stage_errors_name_the_failing_stage() {
        let inner = BuyerScopeError::Directory("search backend unreachable".into());
        let err = BuyerScopeError::stage("preview-search", inner);
        let text = err.to_string();
        assert!(text.contains("preview-search"));
        assert!(text.starts_with("stage '"));
    }
}
