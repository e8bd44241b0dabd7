//! Error handling module for reelcut

use thiserror::Error;

use crate::domain::errors::{TimelineError, ValidationError};

/// Main error type for editor operations
#[derive(Error, Debug)]
pub enum EditorError {
    /// Timeline position or cut range outside valid bounds
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Processing options or command state rejected before launch
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Subprocess could not be started or its streams attached
    #[error("Failed to launch transcoder: {message}")]
    Launch { message: String },

    /// Subprocess ran but exited unsuccessfully
    #[error("Transcoder exited with {status}: {message}")]
    Execution { status: String, message: String },

    /// Subprocess outlived the configured deadline and was killed
    #[error("Transcoder did not finish within {seconds}s")]
    TimedOut { seconds: u64 },

    /// Progress or duration text could not be parsed
    #[error("Failed to parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Invalid configuration value or file
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    /// True for failures reported before any subprocess was spawned
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation(_))
    }

    /// True for timeline position and cut-range failures
    pub fn is_range(&self) -> bool {
        matches!(self, EditorError::Timeline(_))
    }

    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        EditorError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for editor operations
pub type EditorResult<T> = std::result::Result<T, EditorError>;
