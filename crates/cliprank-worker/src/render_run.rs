//! Render orchestrator: materialize one clip into an output video.
//!
//! All preconditions (clip/job existence, processed-video presence, the
//! concurrency cap and the duplicate-render guard) are checked at
//! submission time in the service; by the time this runs, the render
//! record exists and holds a gate slot. The slot is released on every
//! terminal path.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::time::timeout;
use tracing::{error, info, warn};

use cliprank_models::{Render, RenderId, RunStatus};

use crate::context::PipelineContext;
use crate::error::{WorkerError, WorkerResult};
use crate::timeouts::render_timeout;

/// Execute one render. Entry point for the scheduler; failures are
/// persisted onto the record, never returned.
pub async fn run_render(ctx: Arc<PipelineContext>, render_id: RenderId) {
    let mut render = match ctx.store.claim_render(&render_id).await {
        Ok(render) => render,
        Err(err) => {
            info!(render_id = %render_id, error = %err, "render not claimable, skipping");
            // A render cancelled or cascade-deleted before dispatch
            // still holds its slot; a deleted record no longer tells us
            // the clip, so release by render id.
            match ctx.store.get_render(&render_id).await {
                Ok(stale) => ctx.gate.release(&stale.clip_id).await,
                Err(_) => ctx.gate.release_render(&render_id).await,
            }
            return;
        }
    };

    info!(render_id = %render_id, clip_id = %render.clip_id, "render started");

    match execute(&ctx, &mut render).await {
        Ok(output) => {
            render.complete(output);
            if let Err(err) = ctx.store.update_render(&render).await {
                error!(render_id = %render_id, error = %err, "failed to persist render completion");
            } else {
                info!(render_id = %render_id, "render ready");
                notify_render(&ctx, &render).await;
            }
        }
        Err(err) => {
            let cancelled = matches!(
                ctx.store.get_render(&render_id).await,
                Ok(r) if r.status == RunStatus::Cancelled
            );
            if cancelled {
                info!(render_id = %render_id, "render cancelled, discarding failure");
            } else {
                warn!(render_id = %render_id, error = %err, "render failed");
                render.fail(err.to_string());
                if let Err(err) = ctx.store.update_render(&render).await {
                    error!(render_id = %render_id, error = %err, "failed to persist render failure");
                } else {
                    notify_render(&ctx, &render).await;
                }
            }
        }
    }

    ctx.gate.release(&render.clip_id).await;
}

async fn execute(ctx: &PipelineContext, render: &mut Render) -> WorkerResult<String> {
    let clip = ctx.store.get_clip(&render.clip_id).await?;
    let job = ctx.store.get_job(&clip.job_id).await?;

    let output = ctx.layout.render_output_path(&render.id);
    if output.exists() {
        info!(render_id = %render.id, "output present, skipping render");
        return Ok(output.display().to_string());
    }

    let source = job
        .processed_video_path
        .as_deref()
        .filter(|p| Path::new(p).exists())
        .ok_or_else(|| WorkerError::render("processed video artifact missing"))?;

    render.progress = 10;
    ctx.store.update_render(render).await?;

    let per_attempt = render_timeout(&ctx.config, clip.duration_sec());
    let produced = timeout(
        per_attempt,
        ctx.renderer
            .render(Path::new(source), clip.start_sec, clip.end_sec, &render.options, &output),
    )
    .await
    .map_err(|_| WorkerError::render("render timed out"))?
    .map_err(|e| WorkerError::render(e.to_string()))?;

    Ok(produced.display().to_string())
}

async fn notify_render(ctx: &PipelineContext, render: &Render) {
    let payload = json!({
        "render_id": render.id.as_str(),
        "clip_id": render.clip_id.as_str(),
        "status": render.status.as_str(),
        "output_path": render.output_path,
        "error_message": render.error_message,
    });
    ctx.notify_best_effort(render.webhook_url.as_deref(), payload)
        .await;
}
