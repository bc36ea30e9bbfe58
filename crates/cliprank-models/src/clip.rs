//! Clip record: a persisted, selected highlight.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ClipId, JobId};

/// Descriptive metadata carried over from scoring, used for titling
/// and caption generation downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipMetadata {
    /// Keyword categories that matched during scoring
    #[serde(default)]
    pub categories: Vec<String>,

    /// Word count of the transcript span
    #[serde(default)]
    pub word_count: usize,

    /// Whether an interrogative pattern was detected
    #[serde(default)]
    pub has_question: bool,

    /// Number of transcript segments the span covers
    #[serde(default)]
    pub segment_count: usize,
}

/// A selected highlight belonging to exactly one job.
///
/// Immutable once created, except for thumbnail backfill.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,

    /// Owning job
    pub job_id: JobId,

    /// Span start in seconds
    pub start_sec: f64,

    /// Span end in seconds (start_sec < end_sec)
    pub end_sec: f64,

    /// Highlight score
    pub score: f64,

    /// Human-readable title
    pub title: String,

    /// Transcript snippet shown alongside the clip
    pub transcript_snippet: String,

    /// Thumbnail artifact path, if one was extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,

    /// Scoring metadata
    #[serde(default)]
    pub metadata: ClipMetadata,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Clip {
    /// Create a new clip for a job.
    pub fn new(
        job_id: JobId,
        start_sec: f64,
        end_sec: f64,
        score: f64,
        title: impl Into<String>,
        transcript_snippet: impl Into<String>,
    ) -> Self {
        Self {
            id: ClipId::new(),
            job_id,
            start_sec,
            end_sec,
            score,
            title: title.into(),
            transcript_snippet: transcript_snippet.into(),
            thumbnail_path: None,
            metadata: ClipMetadata::default(),
            created_at: Utc::now(),
        }
    }

    /// Attach scoring metadata.
    pub fn with_metadata(mut self, metadata: ClipMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Clip duration in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Midpoint of the span, used for thumbnail extraction.
    pub fn midpoint_sec(&self) -> f64 {
        (self.start_sec + self.end_sec) / 2.0
    }
}
