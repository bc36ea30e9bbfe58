//! Worker error types.

use thiserror::Error;

use cliprank_models::RunStatus;
use cliprank_store::StoreError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Acquisition failed: {0}")]
    Acquisition(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Highlight generation failed: {0}")]
    HighlightGeneration(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Render limit reached: {active} of {max} renders active")]
    ConcurrencyLimit { active: usize, max: usize },

    #[error("A render is already queued or processing for clip {0}")]
    DuplicateRender(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: cannot {action} a {status} record")]
    InvalidState {
        action: &'static str,
        status: RunStatus,
    },

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for WorkerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => WorkerError::NotFound(msg),
            other => WorkerError::Store(other),
        }
    }
}

impl WorkerError {
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// User-retryable failures: resubmission may succeed once the
    /// external condition clears. InvalidState/NotFound are caller bugs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::Acquisition(_)
                | WorkerError::Transcription(_)
                | WorkerError::Render(_)
                | WorkerError::Store(_)
        )
    }
}
