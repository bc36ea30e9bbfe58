//! In-memory `JobStore` implementation.
//!
//! Backs every orchestrator test and doubles as the reference for the
//! claim semantics a real backend must provide.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cliprank_models::{Clip, ClipId, Job, JobId, Render, RenderId, RunStatus};

use crate::error::{StoreError, StoreResult};
use crate::store::JobStore;

/// In-memory store with per-map RwLocks. Claims run under the write
/// lock, so check-and-transition is atomic.
#[derive(Default)]
pub struct MemoryStore {
    jobs: RwLock<HashMap<JobId, Job>>,
    clips: RwLock<HashMap<ClipId, Clip>>,
    renders: RwLock<HashMap<RenderId, Render>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, job: Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::conflict(format!("job {} exists", job.id)));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Job> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("job {}", id)))
    }

    async fn update_job(&self, job: &Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&job.id) {
            return Err(StoreError::not_found(format!("job {}", job.id)));
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn update_job_if_active(&self, job: &Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let stored = jobs
            .get(&job.id)
            .ok_or_else(|| StoreError::not_found(format!("job {}", job.id)))?;
        if stored.status.is_terminal() {
            return Err(StoreError::conflict(format!(
                "job {} is {}",
                job.id, stored.status
            )));
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn claim_job(&self, id: &JobId) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("job {}", id)))?;
        if job.status != RunStatus::Queued {
            return Err(StoreError::conflict(format!(
                "job {} is {}, not queued",
                id, job.status
            )));
        }
        job.status = RunStatus::Processing;
        job.updated_at = chrono::Utc::now();
        Ok(job.clone())
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        jobs.remove(id)
            .ok_or_else(|| StoreError::not_found(format!("job {}", id)))?;

        // Cascade: clips of the job, then renders of those clips.
        let mut clips = self.clips.write().await;
        let clip_ids: Vec<ClipId> = clips
            .values()
            .filter(|c| &c.job_id == id)
            .map(|c| c.id.clone())
            .collect();
        for clip_id in &clip_ids {
            clips.remove(clip_id);
        }

        let mut renders = self.renders.write().await;
        renders.retain(|_, r| !clip_ids.contains(&r.clip_id));
        Ok(())
    }

    async fn create_clip(&self, clip: Clip) -> StoreResult<()> {
        self.clips.write().await.insert(clip.id.clone(), clip);
        Ok(())
    }

    async fn get_clip(&self, id: &ClipId) -> StoreResult<Clip> {
        self.clips
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("clip {}", id)))
    }

    async fn clips_by_job(&self, job_id: &JobId) -> StoreResult<Vec<Clip>> {
        let mut clips: Vec<Clip> = self
            .clips
            .read()
            .await
            .values()
            .filter(|c| &c.job_id == job_id)
            .cloned()
            .collect();
        clips.sort_by(|a, b| {
            a.start_sec
                .partial_cmp(&b.start_sec)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(clips)
    }

    async fn delete_clip(&self, id: &ClipId) -> StoreResult<()> {
        self.clips
            .write()
            .await
            .remove(id)
            .ok_or_else(|| StoreError::not_found(format!("clip {}", id)))?;
        self.renders.write().await.retain(|_, r| &r.clip_id != id);
        Ok(())
    }

    async fn set_clip_thumbnail(&self, id: &ClipId, path: &str) -> StoreResult<()> {
        let mut clips = self.clips.write().await;
        let clip = clips
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("clip {}", id)))?;
        clip.thumbnail_path = Some(path.to_string());
        Ok(())
    }

    async fn create_render(&self, render: Render) -> StoreResult<()> {
        self.renders
            .write()
            .await
            .insert(render.id.clone(), render);
        Ok(())
    }

    async fn get_render(&self, id: &RenderId) -> StoreResult<Render> {
        self.renders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("render {}", id)))
    }

    async fn update_render(&self, render: &Render) -> StoreResult<()> {
        let mut renders = self.renders.write().await;
        if !renders.contains_key(&render.id) {
            return Err(StoreError::not_found(format!("render {}", render.id)));
        }
        renders.insert(render.id.clone(), render.clone());
        Ok(())
    }

    async fn claim_render(&self, id: &RenderId) -> StoreResult<Render> {
        let mut renders = self.renders.write().await;
        let render = renders
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("render {}", id)))?;
        if render.status != RunStatus::Queued {
            return Err(StoreError::conflict(format!(
                "render {} is {}, not queued",
                id, render.status
            )));
        }
        render.status = RunStatus::Processing;
        render.updated_at = chrono::Utc::now();
        Ok(render.clone())
    }

    async fn renders_by_clip(&self, clip_id: &ClipId) -> StoreResult<Vec<Render>> {
        Ok(self
            .renders
            .read()
            .await
            .values()
            .filter(|r| &r.clip_id == clip_id)
            .cloned()
            .collect())
    }

    async fn list_renders(&self) -> StoreResult<Vec<Render>> {
        Ok(self.renders.read().await.values().cloned().collect())
    }
}
