//! Error types for the scenescribe-core library.
//!
//! All fallible operations in the core return [`CoreResult`]. Collaborator
//! errors distinguish transient failures (retried by the pipeline driver's
//! retry policy) from fatal per-video conditions such as a malformed
//! transcript.

use thiserror::Error;

/// Custom error types for scenescribe.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No processable video files found")]
    NoFilesFound,

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    #[error("Collaborator '{collaborator}' timed out")]
    CollaboratorTimeout { collaborator: String },

    #[error("Collaborator '{collaborator}' failed: {message}")]
    CollaboratorFailure {
        collaborator: String,
        message: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl CoreError {
    /// Whether the error is a transient collaborator condition worth retrying.
    ///
    /// Malformed input and cancellation are never retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::CollaboratorTimeout { .. } | CoreError::CollaboratorFailure { .. }
        )
    }
}

/// Result type for scenescribe operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
