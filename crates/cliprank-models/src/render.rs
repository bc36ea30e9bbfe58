//! Render record: one materialization attempt of a clip.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ClipId, RenderId, RunStatus};

/// Options controlling how a clip is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOptions {
    /// Track faces and keep them centered in the vertical crop
    #[serde(default)]
    pub face_tracking: bool,

    /// Content-aware crop when no faces are found
    #[serde(default)]
    pub smart_crop: bool,

    /// Burn captions from the transcript snippet
    #[serde(default)]
    pub captions: bool,

    /// Overlay the watermark
    #[serde(default)]
    pub watermark: bool,
}

/// A render of a single clip into an output video file.
///
/// Invariant: at most one render per clip is queued or processing, and
/// the global number of active renders stays under the configured cap.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Render {
    /// Unique render ID
    pub id: RenderId,

    /// Clip being rendered
    pub clip_id: ClipId,

    /// Lifecycle status
    #[serde(default)]
    pub status: RunStatus,

    /// Progress (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Output artifact path once ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Render options
    #[serde(default)]
    pub options: RenderOptions,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Optional webhook notified on terminal states
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Render {
    /// Create a new queued render for a clip.
    pub fn new(clip_id: ClipId, options: RenderOptions) -> Self {
        let now = Utc::now();
        Self {
            id: RenderId::new(),
            clip_id,
            status: RunStatus::Queued,
            progress: 0,
            output_path: None,
            options,
            error_message: None,
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

    /// Mark the render ready with its output path.
    pub fn complete(&mut self, output_path: impl Into<String>) {
        self.status = RunStatus::Ready;
        self.progress = 100;
        self.output_path = Some(output_path.into());
        self.error_message = None;
        self.updated_at = Utc::now();
    }

    /// Mark the render failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Reset a failed render for requeueing.
    pub fn reset_for_retry(&mut self) {
        self.status = RunStatus::Queued;
        self.progress = 0;
        self.error_message = None;
        self.updated_at = Utc::now();
    }
}
