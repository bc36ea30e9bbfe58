//! Render orchestrator and concurrency-gate tests.

mod common;

use std::path::Path;
use std::sync::atomic::Ordering;

use cliprank_models::{Clip, ClipId, Job, RenderId, RenderOptions, RunStatus};
use cliprank_store::JobStore;
use cliprank_worker::WorkerError;

use common::Harness;

/// Seed a ready job with a processed video on disk and one clip, the
/// state a job is in after its pipeline (cleanup included) finished.
async fn seed_ready_job(h: &Harness) -> (Job, Clip) {
    let mut job = Job::new_youtube("https://youtube.com/watch?v=abc");
    job.status = RunStatus::Ready;
    let processed = h.ctx.layout.processed_video_path(&job.id);
    tokio::fs::write(&processed, b"video-bytes").await.unwrap();
    job.processed_video_path = Some(processed.display().to_string());
    h.store.create_job(job.clone()).await.unwrap();

    let clip = Clip::new(job.id.clone(), 10.0, 40.0, 75.0, "Highlight 1", "snippet");
    h.store.create_clip(clip.clone()).await.unwrap();
    (job, clip)
}

#[tokio::test]
async fn test_render_happy_path() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    let render_id = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap();
    h.service.wait_idle().await;

    let render = h.store.get_render(&render_id).await.unwrap();
    assert_eq!(render.status, RunStatus::Ready);
    assert_eq!(render.progress, 100);
    let output = render.output_path.as_deref().unwrap();
    assert!(Path::new(output).exists());
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.ctx.gate.active_count().await, 0);
}

#[tokio::test]
async fn test_concurrency_cap_rejects_without_creating_record() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    // Two renders already hold the cap of 2.
    h.ctx
        .gate
        .try_claim(&ClipId::new(), &RenderId::new())
        .await
        .unwrap();
    h.ctx
        .gate
        .try_claim(&ClipId::new(), &RenderId::new())
        .await
        .unwrap();

    let err = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::ConcurrencyLimit { max: 2, .. }));
    assert!(h.store.list_renders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_render_rejected_without_creating_record() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    h.ctx.gate.try_claim(&clip.id, &RenderId::new()).await.unwrap();

    let err = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::DuplicateRender(_)));
    assert!(h.store.list_renders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_processed_video_rejects_submission() {
    let h = Harness::new();
    // Ready job whose processed video never landed on disk.
    let mut job = Job::new_youtube("https://youtube.com/watch?v=abc");
    job.status = RunStatus::Ready;
    h.store.create_job(job.clone()).await.unwrap();
    let clip = Clip::new(job.id.clone(), 10.0, 40.0, 75.0, "Highlight 1", "snippet");
    h.store.create_clip(clip.clone()).await.unwrap();

    let err = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::NotFound(_)));
    assert!(h.store.list_renders().await.unwrap().is_empty());
    assert_eq!(h.ctx.gate.active_count().await, 0);
}

#[tokio::test]
async fn test_failed_render_retries_to_ready() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;
    h.renderer.fail_remaining.store(1, Ordering::SeqCst);

    let render_id = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap();
    h.service.wait_idle().await;

    let render = h.store.get_render(&render_id).await.unwrap();
    assert_eq!(render.status, RunStatus::Failed);
    assert!(render
        .error_message
        .as_deref()
        .unwrap()
        .contains("Render failed"));
    // Slot released on failure: the retry can claim it again.
    assert_eq!(h.ctx.gate.active_count().await, 0);

    h.service.retry_render(&render_id).await.unwrap();
    h.service.wait_idle().await;

    let render = h.store.get_render(&render_id).await.unwrap();
    assert_eq!(render.status, RunStatus::Ready);
    assert!(render.error_message.is_none());
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.ctx.gate.active_count().await, 0);
}

#[tokio::test]
async fn test_retry_render_requires_failed_status() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    let render_id = h
        .service
        .submit_render(&clip.id, RenderOptions::default(), None)
        .await
        .unwrap();
    h.service.wait_idle().await;

    let err = h.service.retry_render(&render_id).await.unwrap_err();
    assert!(matches!(
        err,
        WorkerError::InvalidState {
            status: RunStatus::Ready,
            ..
        }
    ));
}

#[tokio::test]
async fn test_render_webhook_notified() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    let render_id = h
        .service
        .submit_render(
            &clip.id,
            RenderOptions::default(),
            Some("https://example.com/render-hook".to_string()),
        )
        .await
        .unwrap();
    h.service.wait_idle().await;

    let payloads = h.notifier.payloads.lock().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].1["render_id"], render_id.as_str());
    assert_eq!(payloads[0].1["status"], "ready");
}

#[tokio::test]
async fn test_render_succeeds_after_completed_job() {
    let h = Harness::new();

    // Run a job end to end, cleanup included, then ask for a render.
    let job = h
        .service
        .create_youtube_job("https://youtube.com/watch?v=abc", None)
        .await
        .unwrap();
    h.service.submit_job(&job.id).await.unwrap();
    h.service.wait_idle().await;
    let job = h.store.get_job(&job.id).await.unwrap();
    assert_eq!(job.status, RunStatus::Ready);
    assert!(job.raw_video_path.is_none());

    let clips = h.store.clips_by_job(&job.id).await.unwrap();
    let render_id = h
        .service
        .submit_render(&clips[0].id, RenderOptions::default(), None)
        .await
        .unwrap();
    h.service.wait_idle().await;

    let render = h.store.get_render(&render_id).await.unwrap();
    assert_eq!(render.status, RunStatus::Ready);
    assert!(Path::new(render.output_path.as_deref().unwrap()).exists());
    assert_eq!(h.ctx.gate.active_count().await, 0);
}

#[tokio::test]
async fn test_render_deleted_before_dispatch_frees_its_slot() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    // A queued render holding a slot whose record is cascade-deleted
    // with its clip before the pool picks it up.
    let render = cliprank_models::Render::new(clip.id.clone(), RenderOptions::default());
    let render_id = render.id.clone();
    h.store.create_render(render).await.unwrap();
    h.ctx.gate.try_claim(&clip.id, &render_id).await.unwrap();
    h.store.delete_clip(&clip.id).await.unwrap();

    cliprank_worker::render_run::run_render(h.ctx.clone(), render_id).await;

    // The slot came back even though the record is gone.
    assert_eq!(h.ctx.gate.active_count().await, 0);
    assert!(!h.ctx.gate.is_clip_active(&clip.id).await);
}

#[tokio::test]
async fn test_delete_job_frees_queued_render_slots() {
    let h = Harness::new();
    let (job, clip) = seed_ready_job(&h).await;

    let render = cliprank_models::Render::new(clip.id.clone(), RenderOptions::default());
    h.ctx.gate.try_claim(&clip.id, &render.id).await.unwrap();
    h.store.create_render(render).await.unwrap();

    h.service.delete_job(&job.id).await.unwrap();
    assert_eq!(h.ctx.gate.active_count().await, 0);
}

#[tokio::test]
async fn test_regenerate_refused_while_clip_render_active() {
    let h = Harness::new();
    let (job, clip) = seed_ready_job(&h).await;

    h.ctx.gate.try_claim(&clip.id, &RenderId::new()).await.unwrap();

    let err = h
        .service
        .regenerate_highlights(&job.id, Some(3), true)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::DuplicateRender(_)));
    // The clip and its slot are untouched.
    assert!(h.store.get_clip(&clip.id).await.is_ok());
    assert_eq!(h.ctx.gate.active_count().await, 1);
}

#[tokio::test]
async fn test_existing_output_short_circuits_render() {
    let h = Harness::new();
    let (_job, clip) = seed_ready_job(&h).await;

    // Create the render record directly so its output path is known
    // before dispatch, then pre-place the output artifact.
    let render = cliprank_models::Render::new(clip.id.clone(), RenderOptions::default());
    let render_id = render.id.clone();
    h.store.create_render(render).await.unwrap();
    let output = h.ctx.layout.render_output_path(&render_id);
    tokio::fs::write(&output, b"rendered-bytes").await.unwrap();

    h.ctx.gate.try_claim(&clip.id, &render_id).await.unwrap();
    cliprank_worker::render_run::run_render(h.ctx.clone(), render_id.clone()).await;

    let render = h.store.get_render(&render_id).await.unwrap();
    assert_eq!(render.status, RunStatus::Ready);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.ctx.gate.active_count().await, 0);
}
