//! Canonical artifact paths under the data directory.
//!
//! The resumability checks in the job pipeline key off these paths, so
//! they must stay stable across retries of the same id.

use std::path::{Path, PathBuf};

use cliprank_models::{ClipId, JobId, RenderId};

/// Artifact directory layout: raw/, processed/, transcripts/,
/// thumbnails/, renders/.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    data_dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Create the directory tree if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for sub in ["raw", "processed", "transcripts", "thumbnails", "renders"] {
            std::fs::create_dir_all(self.data_dir.join(sub))?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Canonical raw-video path for a downloaded job.
    pub fn raw_video_path(&self, job_id: &JobId) -> PathBuf {
        self.data_dir.join("raw").join(format!("{}.mp4", job_id))
    }

    /// Processed-video path for a job. Unlike the raw download this
    /// artifact outlives cleanup; renders and thumbnails read from it.
    pub fn processed_video_path(&self, job_id: &JobId) -> PathBuf {
        self.data_dir
            .join("processed")
            .join(format!("{}.mp4", job_id))
    }

    /// Transcript artifact path for a job.
    pub fn transcript_path(&self, job_id: &JobId) -> PathBuf {
        self.data_dir
            .join("transcripts")
            .join(format!("{}.json", job_id))
    }

    /// Thumbnail path for a clip.
    pub fn thumbnail_path(&self, clip_id: &ClipId) -> PathBuf {
        self.data_dir
            .join("thumbnails")
            .join(format!("{}.jpg", clip_id))
    }

    /// Output path for a render.
    pub fn render_output_path(&self, render_id: &RenderId) -> PathBuf {
        self.data_dir
            .join("renders")
            .join(format!("{}.mp4", render_id))
    }
}
