//! Transcript artifact schema.
//!
//! The transcriber collaborator produces this structure; it is persisted
//! as JSON at the job's transcript path and re-loaded by the highlight
//! engine (and by highlight regeneration).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed segment of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Segment start in seconds
    pub start: f64,

    /// Segment end in seconds
    pub end: f64,

    /// Transcribed text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A full transcript of one source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Detected language code
    pub language: String,

    /// Total video duration in seconds
    pub duration_secs: f64,

    /// Ordered segments
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(
        language: impl Into<String>,
        duration_secs: f64,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            language: language.into(),
            duration_secs,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
