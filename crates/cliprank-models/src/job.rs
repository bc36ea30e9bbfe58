//! Job record: one end-to-end video-to-clips run.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{JobId, JobStep, RunStatus};

/// Where the source video comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Download from a YouTube URL
    Youtube,
    /// Local file provided by the caller before submission
    Upload,
}

/// A job turning one source video into a set of clips.
///
/// Mutated only by the orchestrator instance processing this id.
/// Invariant: `error_message` is set iff `status == Failed`; artifact
/// paths are set only after their producing step completed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Source kind (youtube or upload)
    pub source_kind: SourceKind,

    /// YouTube URL or local upload path
    pub source_ref: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: RunStatus,

    /// Label of the in-flight sub-step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    /// Progress (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Raw video artifact path; deleted by the cleanup step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_video_path: Option<String>,

    /// Processed copy of the source video, set once acquisition
    /// completed. Survives cleanup: rendering and thumbnailing read
    /// from it for the lifetime of the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_video_path: Option<String>,

    /// Transcript artifact path, set once transcription completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<String>,

    /// Steps that completed successfully, recorded transactionally with
    /// each step so retries resume instead of restarting.
    #[serde(default)]
    pub completed_steps: Vec<JobStep>,

    /// Optional webhook notified on terminal states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new queued YouTube job.
    pub fn new_youtube(url: impl Into<String>) -> Self {
        Self::new(SourceKind::Youtube, url)
    }

    /// Create a new queued upload job. `path` must point at the uploaded
    /// file; the acquire step verifies it exists.
    pub fn new_upload(path: impl Into<String>) -> Self {
        let path = path.into();
        let mut job = Self::new(SourceKind::Upload, path.clone());
        job.raw_video_path = Some(path);
        job
    }

    fn new(source_kind: SourceKind, source_ref: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            source_kind,
            source_ref: source_ref.into(),
            status: RunStatus::Queued,
            current_step: None,
            progress: 0,
            error_message: None,
            raw_video_path: None,
            processed_video_path: None,
            transcript_path: None,
            completed_steps: Vec::new(),
            webhook_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a webhook target.
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Record the start of a pipeline step.
    pub fn begin_step(&mut self, step: JobStep, progress: u8) {
        self.current_step = Some(step.as_str().to_string());
        self.progress = progress.min(100);
        self.updated_at = Utc::now();
    }

    /// Record successful completion of a step.
    pub fn mark_step_done(&mut self, step: JobStep) {
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
        self.updated_at = Utc::now();
    }

    /// Whether a step already completed on a previous run.
    pub fn is_step_done(&self, step: JobStep) -> bool {
        self.completed_steps.contains(&step)
    }

    /// Mark the job ready.
    pub fn complete(&mut self) {
        self.status = RunStatus::Ready;
        self.current_step = Some("complete".to_string());
        self.progress = 100;
        self.error_message = None;
        self.updated_at = Utc::now();
    }

    /// Mark the job failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Mark the job cancelled. Status-only: no error message is stored.
    pub fn cancel(&mut self) {
        self.status = RunStatus::Cancelled;
        self.current_step = Some("cancelled".to_string());
        self.error_message = None;
        self.updated_at = Utc::now();
    }

    /// Reset a failed or ready job for requeueing. Completed steps are
    /// kept so the next run resumes from where it stopped; cleanup is
    /// per-run and always re-executes.
    pub fn reset_for_retry(&mut self) {
        self.status = RunStatus::Queued;
        self.current_step = None;
        self.progress = 0;
        self.error_message = None;
        self.completed_steps.retain(|s| *s != JobStep::Cleanup);
        self.updated_at = Utc::now();
    }
}
