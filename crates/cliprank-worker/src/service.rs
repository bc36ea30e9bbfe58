//! The upward-facing surface of the pipeline.
//!
//! `ClipService` owns the scheduler and performs every submission-time
//! precondition check (state transitions, the render cap, the
//! duplicate-render guard) before any record is created or any work is
//! queued. The orchestrators it dispatches never re-validate these.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use cliprank_highlight::generate_highlights;
use cliprank_models::{
    Clip, ClipId, Job, JobId, Render, RenderId, RenderOptions, RunStatus, Transcript,
};

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::job_run::{backfill_thumbnail, run_job};
use crate::render_run::run_render;
use crate::scheduler::Scheduler;

pub struct ClipService {
    ctx: Arc<PipelineContext>,
    scheduler: Scheduler,
}

impl ClipService {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let scheduler = Scheduler::new(ctx.config.max_workers);
        Self { ctx, scheduler }
    }

    /// Wait until all dispatched work has finished.
    pub async fn wait_idle(&self) {
        self.scheduler.wait_idle().await;
    }

    /// Stop admitting new work; already-queued runs drain normally.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    // ---- jobs ----

    /// Create a queued job for a YouTube URL.
    pub async fn create_youtube_job(
        &self,
        url: impl Into<String>,
        webhook_url: Option<String>,
    ) -> WorkerResult<Job> {
        let mut job = Job::new_youtube(url);
        if let Some(url) = webhook_url {
            job = job.with_webhook(url);
        }
        self.ctx.store.create_job(job.clone()).await?;
        info!(job_id = %job.id, "youtube job created");
        Ok(job)
    }

    /// Create a queued job for an already-uploaded local file.
    pub async fn create_upload_job(
        &self,
        path: impl Into<String>,
        webhook_url: Option<String>,
    ) -> WorkerResult<Job> {
        let mut job = Job::new_upload(path);
        if let Some(url) = webhook_url {
            job = job.with_webhook(url);
        }
        self.ctx.store.create_job(job.clone()).await?;
        info!(job_id = %job.id, "upload job created");
        Ok(job)
    }

    /// Dispatch a queued job to the worker pool.
    pub async fn submit_job(&self, job_id: &JobId) -> WorkerResult<()> {
        let job = self.ctx.store.get_job(job_id).await?;
        if job.status != RunStatus::Queued {
            return Err(WorkerError::InvalidState {
                action: "submit",
                status: job.status,
            });
        }
        let ctx = self.ctx.clone();
        let id = job_id.clone();
        self.scheduler.submit(run_job(ctx, id));
        Ok(())
    }

    /// Requeue a failed or ready job and dispatch it. Completed steps
    /// are kept, so the run resumes from the last missing artifact.
    pub async fn retry_job(&self, job_id: &JobId) -> WorkerResult<()> {
        let mut job = self.ctx.store.get_job(job_id).await?;
        if !matches!(job.status, RunStatus::Failed | RunStatus::Ready) {
            return Err(WorkerError::InvalidState {
                action: "retry",
                status: job.status,
            });
        }
        job.reset_for_retry();
        self.ctx.store.update_job(&job).await?;
        let ctx = self.ctx.clone();
        let id = job_id.clone();
        self.scheduler.submit(run_job(ctx, id));
        info!(job_id = %job_id, "job requeued");
        Ok(())
    }

    /// Cancel a queued or processing job. Cooperative: an in-flight
    /// collaborator call is not interrupted, but no further step starts.
    pub async fn cancel_job(&self, job_id: &JobId) -> WorkerResult<()> {
        let mut job = self.ctx.store.get_job(job_id).await?;
        if !job.status.is_active() {
            return Err(WorkerError::InvalidState {
                action: "cancel",
                status: job.status,
            });
        }
        job.cancel();
        // Guarded write: if the run finished between the check above and
        // here, the cancel bounces instead of clobbering the terminal
        // status.
        if let Err(err) = self.ctx.store.update_job_if_active(&job).await {
            if err.is_conflict() {
                let status = self.ctx.store.get_job(job_id).await?.status;
                return Err(WorkerError::InvalidState {
                    action: "cancel",
                    status,
                });
            }
            return Err(err.into());
        }
        info!(job_id = %job_id, "job cancelled");
        let payload = json!({
            "job_id": job.id.as_str(),
            "status": job.status.as_str(),
        });
        self.ctx
            .notify_best_effort(job.webhook_url.as_deref(), payload)
            .await;
        Ok(())
    }

    /// Delete a terminal job, its clips and renders, and their
    /// artifacts. Artifact removal is best-effort.
    pub async fn delete_job(&self, job_id: &JobId) -> WorkerResult<()> {
        let job = self.ctx.store.get_job(job_id).await?;
        if !job.status.is_terminal() {
            return Err(WorkerError::InvalidState {
                action: "delete",
                status: job.status,
            });
        }

        for clip in self.ctx.store.clips_by_job(job_id).await? {
            remove_artifact(clip.thumbnail_path.as_deref()).await;
            let renders = self.ctx.store.renders_by_clip(&clip.id).await?;
            for render in &renders {
                remove_artifact(render.output_path.as_deref()).await;
            }
            // Queued renders die with their records; free their gate
            // slots now. A processing render releases its own slot when
            // its run finishes.
            if !renders.iter().any(|r| r.status == RunStatus::Processing) {
                self.ctx.gate.release(&clip.id).await;
            }
        }
        remove_artifact(job.raw_video_path.as_deref()).await;
        remove_artifact(job.processed_video_path.as_deref()).await;
        remove_artifact(job.transcript_path.as_deref()).await;

        self.ctx.store.delete_job(job_id).await?;
        info!(job_id = %job_id, "job deleted");
        Ok(())
    }

    // ---- renders ----

    /// Create and dispatch a render for a clip.
    ///
    /// Preconditions, checked before any record exists: the clip and
    /// its job must exist, the job's processed video must be present,
    /// the global cap must have room and no other render for this clip
    /// may be active. A violation returns the typed error and leaves no
    /// render record behind.
    pub async fn submit_render(
        &self,
        clip_id: &ClipId,
        options: RenderOptions,
        webhook_url: Option<String>,
    ) -> WorkerResult<RenderId> {
        let clip = self.ctx.store.get_clip(clip_id).await?;
        let job = self.ctx.store.get_job(&clip.job_id).await?;
        if !job
            .processed_video_path
            .as_deref()
            .is_some_and(|p| Path::new(p).exists())
        {
            return Err(WorkerError::not_found(format!(
                "processed video artifact for job {}",
                job.id
            )));
        }

        let mut render = Render::new(clip_id.clone(), options);
        if let Some(url) = webhook_url {
            render = render.with_webhook(url);
        }
        let render_id = render.id.clone();

        self.ctx.gate.try_claim(clip_id, &render_id).await?;

        // Superseded outputs from earlier renders of this clip are only
        // taking up disk.
        for old in self.ctx.store.renders_by_clip(clip_id).await.unwrap_or_default() {
            remove_artifact(old.output_path.as_deref()).await;
        }
        if let Err(err) = self.ctx.store.create_render(render).await {
            self.ctx.gate.release(clip_id).await;
            return Err(err.into());
        }

        let ctx = self.ctx.clone();
        let id = render_id.clone();
        self.scheduler.submit(run_render(ctx, id));
        info!(render_id = %render_id, clip_id = %clip_id, "render submitted");
        Ok(render_id)
    }

    /// Requeue a failed render and dispatch it, re-checking the cap and
    /// the duplicate guard.
    pub async fn retry_render(&self, render_id: &RenderId) -> WorkerResult<()> {
        let mut render = self.ctx.store.get_render(render_id).await?;
        if render.status != RunStatus::Failed {
            return Err(WorkerError::InvalidState {
                action: "retry",
                status: render.status,
            });
        }

        self.ctx.gate.try_claim(&render.clip_id, render_id).await?;
        render.reset_for_retry();
        if let Err(err) = self.ctx.store.update_render(&render).await {
            self.ctx.gate.release(&render.clip_id).await;
            return Err(err.into());
        }

        let ctx = self.ctx.clone();
        let id = render_id.clone();
        self.scheduler.submit(run_render(ctx, id));
        info!(render_id = %render_id, "render requeued");
        Ok(())
    }

    // ---- highlights ----

    /// Re-run the highlight engine for a ready job, replacing its
    /// clips. Refused while any of the job's clips has an active
    /// render. Requires the transcript artifact; thumbnails are
    /// re-extracted from the processed video.
    pub async fn regenerate_highlights(
        &self,
        job_id: &JobId,
        desired_count: Option<usize>,
        adaptive: bool,
    ) -> WorkerResult<Vec<Clip>> {
        let job = self.ctx.store.get_job(job_id).await?;
        if job.status != RunStatus::Ready {
            return Err(WorkerError::InvalidState {
                action: "regenerate highlights for",
                status: job.status,
            });
        }

        let old_clips = self.ctx.store.clips_by_job(job_id).await?;
        for clip in &old_clips {
            if self.ctx.gate.is_clip_active(&clip.id).await {
                return Err(WorkerError::DuplicateRender(clip.id.to_string()));
            }
        }

        let transcript = load_transcript(&job).await?;
        let highlights =
            generate_highlights(&transcript, desired_count, adaptive, &self.ctx.config.highlight);
        if highlights.is_empty() {
            return Err(WorkerError::HighlightGeneration(
                "no highlights generated".to_string(),
            ));
        }

        for clip in &old_clips {
            remove_artifact(clip.thumbnail_path.as_deref()).await;
            self.ctx.store.delete_clip(&clip.id).await?;
        }

        for highlight in highlights {
            let clip = Clip::new(
                job_id.clone(),
                highlight.start,
                highlight.end,
                highlight.score,
                highlight.title,
                highlight.snippet,
            )
            .with_metadata(highlight.metadata);
            let clip_id = clip.id.clone();
            let midpoint = clip.midpoint_sec();
            self.ctx.store.create_clip(clip).await?;
            backfill_thumbnail(&self.ctx, &job, &clip_id, midpoint).await;
        }

        let clips = self.ctx.store.clips_by_job(job_id).await?;
        info!(job_id = %job_id, count = clips.len(), "highlights regenerated");
        Ok(clips)
    }
}

async fn load_transcript(job: &Job) -> WorkerResult<Transcript> {
    let path = job
        .transcript_path
        .as_deref()
        .filter(|p| Path::new(p).exists())
        .ok_or_else(|| {
            WorkerError::not_found(format!("transcript artifact for job {}", job.id))
        })?;
    let data = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&data)
        .map_err(|e| WorkerError::HighlightGeneration(format!("transcript parse: {e}")))
}

async fn remove_artifact(path: Option<&str>) {
    let Some(path) = path else { return };
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path, error = %err, "artifact removal failed");
        }
    }
}
