//! Status enums shared by jobs and renders, plus the pipeline step labels.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a job or render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting for a worker slot
    #[default]
    Queued,
    /// Actively being processed
    Processing,
    /// Completed successfully
    Ready,
    /// Failed with an error
    Failed,
    /// Cancelled by the user
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Processing => "processing",
            RunStatus::Ready => "ready",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further processing (but ready/failed may be requeued).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Ready | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    /// Active states count against concurrency limits.
    pub fn is_active(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::Processing)
    }

    /// Check whether a transition to `next` is on the allowed graph.
    ///
    /// queued -> processing | cancelled
    /// processing -> ready | failed | cancelled
    /// failed -> queued (retry)
    /// ready -> queued (reprocess)
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Queued, Processing)
                | (Queued, Cancelled)
                | (Processing, Ready)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Failed, Queued)
                | (Ready, Queued)
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline steps executed by the job orchestrator, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStep {
    /// Download or locate the source video
    Acquire,
    /// Produce the transcript artifact
    Transcribe,
    /// Run the highlight engine and materialize clips
    GenerateHighlights,
    /// Remove the raw video to reclaim disk
    Cleanup,
}

impl JobStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStep::Acquire => "acquire",
            JobStep::Transcribe => "transcribe",
            JobStep::GenerateHighlights => "generate_highlights",
            JobStep::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for JobStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
