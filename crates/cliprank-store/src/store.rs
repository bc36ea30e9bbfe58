//! The `JobStore` trait: everything the orchestrators need from
//! persistence.

use async_trait::async_trait;

use cliprank_models::{Clip, ClipId, Job, JobId, Render, RenderId};

use crate::error::StoreResult;

/// Persistence contract for jobs, clips and renders.
///
/// Every update is atomic per record. `claim_*` methods are the
/// check-and-act guard against double execution: they transition
/// queued -> processing in one step and fail with `Conflict` when the
/// record is in any other state.
#[async_trait]
pub trait JobStore: Send + Sync {
    // ---- jobs ----

    async fn create_job(&self, job: Job) -> StoreResult<()>;

    async fn get_job(&self, id: &JobId) -> StoreResult<Job>;

    /// Replace the stored job record.
    async fn update_job(&self, job: &Job) -> StoreResult<()>;

    /// Replace the stored job record unless it already reached a
    /// terminal status, in which case fail with `Conflict` and leave it
    /// untouched. Check-and-write is atomic, so an in-flight run can
    /// never overwrite a cancellation it has not seen yet.
    async fn update_job_if_active(&self, job: &Job) -> StoreResult<()>;

    /// Atomically transition a queued job to processing and return it.
    /// Fails with `Conflict` if the job is not queued, which makes
    /// double execution of the same id impossible.
    async fn claim_job(&self, id: &JobId) -> StoreResult<Job>;

    /// Delete a job, cascading to its clips and renders.
    async fn delete_job(&self, id: &JobId) -> StoreResult<()>;

    // ---- clips ----

    async fn create_clip(&self, clip: Clip) -> StoreResult<()>;

    async fn get_clip(&self, id: &ClipId) -> StoreResult<Clip>;

    async fn clips_by_job(&self, job_id: &JobId) -> StoreResult<Vec<Clip>>;

    async fn delete_clip(&self, id: &ClipId) -> StoreResult<()>;

    /// Backfill the thumbnail path, the only permitted clip mutation.
    async fn set_clip_thumbnail(&self, id: &ClipId, path: &str) -> StoreResult<()>;

    // ---- renders ----

    async fn create_render(&self, render: Render) -> StoreResult<()>;

    async fn get_render(&self, id: &RenderId) -> StoreResult<Render>;

    /// Replace the stored render record.
    async fn update_render(&self, render: &Render) -> StoreResult<()>;

    /// Atomically transition a queued render to processing and return it.
    async fn claim_render(&self, id: &RenderId) -> StoreResult<Render>;

    async fn renders_by_clip(&self, clip_id: &ClipId) -> StoreResult<Vec<Render>>;

    /// All renders, used for the concurrency-cap count and diagnostics.
    async fn list_renders(&self) -> StoreResult<Vec<Render>>;
}
