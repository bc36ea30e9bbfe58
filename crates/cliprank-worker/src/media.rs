//! Collaborator contracts for the concrete media tools.
//!
//! The orchestrators only see these traits; the yt-dlp/whisper/ffmpeg
//! implementations live in the embedding process. All calls are treated
//! as blocking, timeout-bounded operations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use cliprank_models::{RenderOptions, Transcript};

/// Transcription tier. `Fast` is the cheaper fallback used when the
/// first attempt fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeQuality {
    Standard,
    Fast,
}

/// Fetch a source video to a local path.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, source_ref: &str, dest: &Path) -> anyhow::Result<()>;
}

/// Produce a transcript from a video file.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        video: &Path,
        quality: TranscribeQuality,
    ) -> anyhow::Result<Transcript>;
}

/// Extract a still frame as a clip thumbnail.
#[async_trait]
pub trait Thumbnailer: Send + Sync {
    async fn extract_thumbnail(
        &self,
        video: &Path,
        timestamp_sec: f64,
        dest: &Path,
    ) -> anyhow::Result<()>;
}

/// Materialize a vertical clip from a span of the source video.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        video: &Path,
        start_sec: f64,
        end_sec: f64,
        options: &RenderOptions,
        dest: &Path,
    ) -> anyhow::Result<PathBuf>;
}

/// Deliver a webhook payload. Best-effort: failures are logged by the
/// caller and never affect the record being reported on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, url: &str, payload: serde_json::Value) -> anyhow::Result<()>;
}
