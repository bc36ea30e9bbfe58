//! Shared test fixtures: fake media collaborators over a MemoryStore.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cliprank_models::{RenderOptions, Transcript, TranscriptSegment};
use cliprank_store::MemoryStore;
use cliprank_worker::{
    ClipService, Downloader, Notifier, PipelineContext, Renderer, Thumbnailer, TranscribeQuality,
    Transcriber, WorkerConfig,
};

/// 600s transcript, 30 segments of 20s, keyword hit every 5th segment.
pub fn sample_transcript() -> Transcript {
    let segments = (0..30)
        .map(|i| {
            let text = if i % 5 == 0 {
                format!("this is important, a secret trick you must know {i}")
            } else {
                format!("segment {i} with some ordinary spoken words")
            };
            TranscriptSegment::new(i as f64 * 20.0, (i + 1) as f64 * 20.0, text)
        })
        .collect();
    Transcript::new("en", 600.0, segments)
}

#[derive(Default)]
pub struct FakeDownloader {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, _source_ref: &str, dest: &Path) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("network unreachable");
        }
        tokio::fs::write(dest, b"video-bytes").await?;
        Ok(())
    }
}

pub struct FakeTranscriber {
    pub standard_calls: AtomicUsize,
    pub fast_calls: AtomicUsize,
    pub fail_standard: AtomicBool,
    pub fail_all: AtomicBool,
    pub transcript: Transcript,
}

impl Default for FakeTranscriber {
    fn default() -> Self {
        Self {
            standard_calls: AtomicUsize::new(0),
            fast_calls: AtomicUsize::new(0),
            fail_standard: AtomicBool::new(false),
            fail_all: AtomicBool::new(false),
            transcript: sample_transcript(),
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(
        &self,
        _video: &Path,
        quality: TranscribeQuality,
    ) -> anyhow::Result<Transcript> {
        match quality {
            TranscribeQuality::Standard => {
                self.standard_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_all.load(Ordering::SeqCst) || self.fail_standard.load(Ordering::SeqCst)
                {
                    anyhow::bail!("model crashed");
                }
            }
            TranscribeQuality::Fast => {
                self.fast_calls.fetch_add(1, Ordering::SeqCst);
                if self.fail_all.load(Ordering::SeqCst) {
                    anyhow::bail!("model crashed");
                }
            }
        }
        Ok(self.transcript.clone())
    }
}

#[derive(Default)]
pub struct FakeThumbnailer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Thumbnailer for FakeThumbnailer {
    async fn extract_thumbnail(
        &self,
        _video: &Path,
        _timestamp_sec: f64,
        dest: &Path,
    ) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(dest, b"jpeg-bytes").await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub calls: AtomicUsize,
    /// Number of upcoming calls that should fail.
    pub fail_remaining: AtomicUsize,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(
        &self,
        _video: &Path,
        _start_sec: f64,
        _end_sec: f64,
        _options: &RenderOptions,
        dest: &Path,
    ) -> anyhow::Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            anyhow::bail!("encoder exited 1");
        }
        tokio::fs::write(dest, b"rendered-bytes").await?;
        Ok(dest.to_path_buf())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub payloads: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, url: &str, payload: serde_json::Value) -> anyhow::Result<()> {
        self.payloads.lock().await.push((url.to_string(), payload));
        Ok(())
    }
}

pub struct Harness {
    pub service: ClipService,
    pub ctx: Arc<PipelineContext>,
    pub store: Arc<MemoryStore>,
    pub downloader: Arc<FakeDownloader>,
    pub transcriber: Arc<FakeTranscriber>,
    pub thumbnailer: Arc<FakeThumbnailer>,
    pub renderer: Arc<FakeRenderer>,
    pub notifier: Arc<FakeNotifier>,
    // Held so the artifact tree outlives the test.
    pub _tmp: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = WorkerConfig {
            data_dir: tmp.path().to_path_buf(),
            ..WorkerConfig::default()
        };

        let store = Arc::new(MemoryStore::new());
        let downloader = Arc::new(FakeDownloader::default());
        let transcriber = Arc::new(FakeTranscriber::default());
        let thumbnailer = Arc::new(FakeThumbnailer::default());
        let renderer = Arc::new(FakeRenderer::default());
        let notifier = Arc::new(FakeNotifier::default());

        let ctx = PipelineContext::new(
            store.clone(),
            downloader.clone(),
            transcriber.clone(),
            thumbnailer.clone(),
            renderer.clone(),
            notifier.clone(),
            config,
        )
        .expect("context");

        Self {
            service: ClipService::new(ctx.clone()),
            ctx,
            store,
            downloader,
            transcriber,
            thumbnailer,
            renderer,
            notifier,
            _tmp: tmp,
        }
    }
}
