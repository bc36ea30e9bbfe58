//! Shared dependencies for one worker process.

use std::sync::Arc;

use tracing::warn;

use cliprank_store::JobStore;

use crate::artifacts::ArtifactLayout;
use crate::config::WorkerConfig;
use crate::gate::RenderGate;
use crate::media::{Downloader, Notifier, Renderer, Thumbnailer, Transcriber};

/// Everything an orchestrator run needs: the store, the media
/// collaborators, the artifact layout and the render gate. Built once
/// at startup and shared via `Arc`.
pub struct PipelineContext {
    pub store: Arc<dyn JobStore>,
    pub downloader: Arc<dyn Downloader>,
    pub transcriber: Arc<dyn Transcriber>,
    pub thumbnailer: Arc<dyn Thumbnailer>,
    pub renderer: Arc<dyn Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub config: WorkerConfig,
    pub layout: ArtifactLayout,
    pub gate: RenderGate,
}

impl PipelineContext {
    /// Wire up a context and create the artifact directory tree.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn JobStore>,
        downloader: Arc<dyn Downloader>,
        transcriber: Arc<dyn Transcriber>,
        thumbnailer: Arc<dyn Thumbnailer>,
        renderer: Arc<dyn Renderer>,
        notifier: Arc<dyn Notifier>,
        config: WorkerConfig,
    ) -> std::io::Result<Arc<Self>> {
        let layout = ArtifactLayout::new(&config.data_dir);
        layout.ensure_dirs()?;
        let gate = RenderGate::new(config.max_concurrent_renders);
        Ok(Arc::new(Self {
            store,
            downloader,
            transcriber,
            thumbnailer,
            renderer,
            notifier,
            config,
            layout,
            gate,
        }))
    }

    /// Fire a webhook if a target is set. Delivery failures are logged
    /// and never affect the record being reported on.
    pub(crate) async fn notify_best_effort(&self, url: Option<&str>, payload: serde_json::Value) {
        let Some(url) = url else { return };
        if let Err(err) = self.notifier.notify(url, payload).await {
            warn!(url, error = %err, "webhook delivery failed");
        }
    }
}
