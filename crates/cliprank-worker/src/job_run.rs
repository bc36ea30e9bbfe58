//! Job orchestrator: one end-to-end pipeline run for a job id.
//!
//! Steps run sequentially: acquire -> transcribe -> generate highlights
//! -> cleanup. Each step is gated on the completed-steps ledger and the
//! presence of its artifact, so re-running a job resumes instead of
//! restarting. Cancellation is cooperative: the stored status is
//! re-checked between steps and an in-flight collaborator call is never
//! aborted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tokio::time::timeout;
use tracing::{error, info, warn};

use cliprank_highlight::generate_highlights;
use cliprank_models::{Clip, Job, JobId, JobStep, RunStatus, SourceKind, Transcript};

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::media::TranscribeQuality;
use crate::timeouts::transcribe_timeout;

/// Execute the job pipeline for one id. Entry point for the scheduler;
/// never returns an error — every failure is persisted onto the record.
pub async fn run_job(ctx: Arc<PipelineContext>, job_id: JobId) {
    let mut job = match ctx.store.claim_job(&job_id).await {
        Ok(job) => job,
        Err(err) => {
            // Not queued (cancelled or already claimed) or gone. Nothing
            // to execute and nothing to persist.
            info!(job_id = %job_id, error = %err, "job not claimable, skipping");
            return;
        }
    };

    info!(job_id = %job_id, source_kind = ?job.source_kind, "job started");

    match execute_steps(&ctx, &mut job).await {
        Ok(true) => {
            job.complete();
            match ctx.store.update_job_if_active(&job).await {
                Ok(()) => {
                    info!(job_id = %job_id, "job ready");
                    notify_job(&ctx, &job).await;
                }
                Err(err) if err.is_conflict() => {
                    // Cancelled after the last step; the stored record
                    // already carries the cancellation.
                    info!(job_id = %job_id, "job cancelled at completion, leaving record");
                }
                Err(err) => {
                    error!(job_id = %job_id, error = %err, "failed to persist job completion");
                }
            }
        }
        Ok(false) => {
            // Cancelled mid-run. The stored record already carries the
            // cancelled status; leave it untouched.
            info!(job_id = %job_id, "job cancelled, stopping");
        }
        Err(err) => {
            job.fail(err.to_string());
            match ctx.store.update_job_if_active(&job).await {
                Ok(()) => {
                    warn!(job_id = %job_id, error = %err, "job failed");
                    notify_job(&ctx, &job).await;
                }
                Err(persist_err) if persist_err.is_conflict() => {
                    info!(job_id = %job_id, "job cancelled during step, discarding failure");
                }
                Err(persist_err) => {
                    error!(job_id = %job_id, error = %persist_err, "failed to persist job failure");
                }
            }
        }
    }
}

/// Run the steps in order. Returns `Ok(false)` when a cancellation was
/// observed between steps.
async fn execute_steps(ctx: &PipelineContext, job: &mut Job) -> WorkerResult<bool> {
    step_acquire(ctx, job).await?;
    if is_cancelled(ctx, &job.id).await? {
        return Ok(false);
    }

    step_transcribe(ctx, job).await?;
    if is_cancelled(ctx, &job.id).await? {
        return Ok(false);
    }

    step_generate_highlights(ctx, job).await?;
    if is_cancelled(ctx, &job.id).await? {
        return Ok(false);
    }

    step_cleanup(ctx, job).await;
    Ok(true)
}

async fn is_cancelled(ctx: &PipelineContext, job_id: &JobId) -> WorkerResult<bool> {
    let stored = ctx.store.get_job(job_id).await?;
    Ok(stored.status == RunStatus::Cancelled)
}

/// Persist step progress. The guarded write bounces with `Conflict`
/// when the stored record went terminal in the meantime, so a
/// cancellation issued mid-step can never be overwritten; the conflict
/// surfaces as a step error and is discarded on the failure path.
async fn persist_step(ctx: &PipelineContext, job: &Job) -> WorkerResult<()> {
    ctx.store.update_job_if_active(job).await?;
    Ok(())
}

/// Step 1: make the source video available locally and keep a
/// processed copy that outlives cleanup. Renders and thumbnails read
/// from the processed copy, so it is the artifact this step is gated
/// on.
async fn step_acquire(ctx: &PipelineContext, job: &mut Job) -> WorkerResult<()> {
    let processed_present = job
        .processed_video_path
        .as_deref()
        .is_some_and(|p| Path::new(p).exists());
    if job.is_step_done(JobStep::Acquire) {
        if processed_present {
            info!(job_id = %job.id, "acquisition already completed, skipping");
            return Ok(());
        }
        // The ledger says done but the artifact is gone; redo the step.
        warn!(job_id = %job.id, "processed video missing despite completed acquisition, re-acquiring");
    } else if processed_present {
        // Artifact landed but the ledger entry never persisted; adopt it.
        info!(job_id = %job.id, "processed video present, skipping acquisition");
        job.mark_step_done(JobStep::Acquire);
        return Ok(());
    }

    job.begin_step(JobStep::Acquire, 10);
    persist_step(ctx, job).await?;

    let raw = match job
        .raw_video_path
        .as_deref()
        .filter(|p| Path::new(p).exists())
    {
        Some(path) => PathBuf::from(path),
        None => match job.source_kind {
            SourceKind::Upload => {
                // The caller placed the file before submitting; a missing
                // path means the upload never landed.
                return Err(WorkerError::acquisition(format!(
                    "uploaded file not found: {}",
                    job.source_ref
                )));
            }
            SourceKind::Youtube => {
                let dest = ctx.layout.raw_video_path(&job.id);
                timeout(
                    ctx.config.download_timeout,
                    ctx.downloader.download(&job.source_ref, &dest),
                )
                .await
                .map_err(|_| WorkerError::acquisition("download timed out"))?
                .map_err(|e| WorkerError::acquisition(e.to_string()))?;
                job.raw_video_path = Some(dest.display().to_string());
                dest
            }
        },
    };

    let processed = ctx.layout.processed_video_path(&job.id);
    tokio::fs::copy(&raw, &processed)
        .await
        .map_err(|e| WorkerError::acquisition(format!("processed copy: {e}")))?;
    job.processed_video_path = Some(processed.display().to_string());

    job.mark_step_done(JobStep::Acquire);
    job.progress = 20;
    persist_step(ctx, job).await?;
    Ok(())
}

/// Step 2: transcribe the processed video, with a single fast-tier
/// fallback attempt when the standard tier fails or times out.
async fn step_transcribe(ctx: &PipelineContext, job: &mut Job) -> WorkerResult<()> {
    let transcript_present = job
        .transcript_path
        .as_deref()
        .is_some_and(|p| Path::new(p).exists());
    if job.is_step_done(JobStep::Transcribe) {
        if transcript_present {
            info!(job_id = %job.id, "transcription already completed, skipping");
            return Ok(());
        }
        warn!(job_id = %job.id, "transcript missing despite completed transcription, redoing");
    } else if transcript_present {
        info!(job_id = %job.id, "transcript present, skipping transcription");
        job.mark_step_done(JobStep::Transcribe);
        return Ok(());
    }

    let source = job
        .processed_video_path
        .clone()
        .ok_or_else(|| WorkerError::transcription("processed video path missing"))?;
    let video = Path::new(&source);

    job.begin_step(JobStep::Transcribe, 50);
    persist_step(ctx, job).await?;

    let per_attempt = transcribe_timeout(&ctx.config, video);
    let transcript = match attempt_transcribe(ctx, video, TranscribeQuality::Standard, per_attempt)
        .await
    {
        Ok(t) => t,
        Err(first) => {
            warn!(job_id = %job.id, error = %first, "transcription failed, retrying with fast tier");
            attempt_transcribe(ctx, video, TranscribeQuality::Fast, per_attempt).await?
        }
    };

    let dest = ctx.layout.transcript_path(&job.id);
    let data = serde_json::to_string(&transcript)
        .map_err(|e| WorkerError::transcription(format!("transcript serialization: {e}")))?;
    tokio::fs::write(&dest, data).await?;

    job.transcript_path = Some(dest.display().to_string());
    job.mark_step_done(JobStep::Transcribe);
    job.progress = 60;
    persist_step(ctx, job).await?;
    Ok(())
}

async fn attempt_transcribe(
    ctx: &PipelineContext,
    video: &Path,
    quality: TranscribeQuality,
    per_attempt: std::time::Duration,
) -> WorkerResult<Transcript> {
    timeout(per_attempt, ctx.transcriber.transcribe(video, quality))
        .await
        .map_err(|_| WorkerError::transcription("transcription timed out"))?
        .map_err(|e| WorkerError::transcription(e.to_string()))
}

/// Step 3: run the highlight engine and persist the selected spans as
/// clips. Existing clips mean a previous run already finished this
/// step, so it is skipped wholesale.
async fn step_generate_highlights(ctx: &PipelineContext, job: &mut Job) -> WorkerResult<()> {
    let existing = ctx.store.clips_by_job(&job.id).await?;
    if !existing.is_empty() {
        info!(job_id = %job.id, clips = existing.len(), "clips present, skipping highlight generation");
        job.mark_step_done(JobStep::GenerateHighlights);
        return Ok(());
    }
    if job.is_step_done(JobStep::GenerateHighlights) {
        // The ledger says done but the clips are gone (deleted since);
        // regenerate them from the transcript.
        warn!(job_id = %job.id, "no clips despite completed generation, regenerating");
    }

    job.begin_step(JobStep::GenerateHighlights, 70);
    persist_step(ctx, job).await?;

    let transcript = load_transcript(job).await?;
    let highlights = generate_highlights(&transcript, None, true, &ctx.config.highlight);
    if highlights.is_empty() {
        return Err(WorkerError::HighlightGeneration(
            "no highlights generated".to_string(),
        ));
    }

    for highlight in highlights {
        let clip = Clip::new(
            job.id.clone(),
            highlight.start,
            highlight.end,
            highlight.score,
            highlight.title,
            highlight.snippet,
        )
        .with_metadata(highlight.metadata);
        let clip_id = clip.id.clone();
        let midpoint = clip.midpoint_sec();
        ctx.store.create_clip(clip).await?;
        backfill_thumbnail(ctx, job, &clip_id, midpoint).await;
    }

    job.mark_step_done(JobStep::GenerateHighlights);
    job.progress = 90;
    persist_step(ctx, job).await?;
    Ok(())
}

async fn load_transcript(job: &Job) -> WorkerResult<Transcript> {
    let path = job
        .transcript_path
        .as_deref()
        .ok_or_else(|| WorkerError::HighlightGeneration("transcript path missing".to_string()))?;
    let data = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&data)
        .map_err(|e| WorkerError::HighlightGeneration(format!("transcript parse: {e}")))
}

/// Extract a thumbnail at the clip midpoint from the processed video.
/// Best-effort: a missing artifact or a tool failure is logged and the
/// clip keeps no thumbnail.
pub(crate) async fn backfill_thumbnail(
    ctx: &PipelineContext,
    job: &Job,
    clip_id: &cliprank_models::ClipId,
    timestamp_sec: f64,
) {
    let Some(source) = job.processed_video_path.as_deref() else {
        return;
    };
    if !Path::new(source).exists() {
        return;
    }
    let dest = ctx.layout.thumbnail_path(clip_id);
    match ctx
        .thumbnailer
        .extract_thumbnail(Path::new(source), timestamp_sec, &dest)
        .await
    {
        Ok(()) => {
            let path = dest.display().to_string();
            if let Err(err) = ctx.store.set_clip_thumbnail(clip_id, &path).await {
                warn!(clip_id = %clip_id, error = %err, "thumbnail backfill not persisted");
            }
        }
        Err(err) => {
            warn!(clip_id = %clip_id, error = %err, "thumbnail extraction failed");
        }
    }
}

/// Step 4: reclaim disk by deleting the raw download. The processed
/// copy stays behind for later renders and thumbnails. Never fatal.
async fn step_cleanup(ctx: &PipelineContext, job: &mut Job) {
    job.begin_step(JobStep::Cleanup, 95);
    if let Err(err) = persist_step(ctx, job).await {
        warn!(job_id = %job.id, error = %err, "cleanup step not persisted");
    }

    if let Some(path) = job.raw_video_path.clone() {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                job.raw_video_path = None;
            }
            Err(err) => {
                warn!(job_id = %job.id, path = %path, error = %err, "raw video cleanup failed");
            }
        }
    }
    job.mark_step_done(JobStep::Cleanup);
}

async fn notify_job(ctx: &PipelineContext, job: &Job) {
    let payload = json!({
        "job_id": job.id.as_str(),
        "status": job.status.as_str(),
        "progress": job.progress,
        "error_message": job.error_message,
    });
    ctx.notify_best_effort(job.webhook_url.as_deref(), payload)
        .await;
}
