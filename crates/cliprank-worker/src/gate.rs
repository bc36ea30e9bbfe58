//! Render concurrency gate.
//!
//! One critical section covers both submission-time checks: the global
//! cap on active renders and the one-active-render-per-clip guard. The
//! claim happens before the Render record is created, so a rejected
//! submission leaves no trace.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use cliprank_models::{ClipId, RenderId};

use crate::error::{WorkerError, WorkerResult};

/// Tracks which clips currently hold an active (queued or processing)
/// render. Entries are released when the render reaches a terminal
/// state, so `active.len()` equals the number of active renders.
pub struct RenderGate {
    max: usize,
    active: Mutex<HashMap<ClipId, RenderId>>,
}

impl RenderGate {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Claim a render slot for a clip. Check-and-insert is atomic under
    /// the gate lock.
    pub async fn try_claim(&self, clip_id: &ClipId, render_id: &RenderId) -> WorkerResult<()> {
        let mut active = self.active.lock().await;
        if active.len() >= self.max {
            return Err(WorkerError::ConcurrencyLimit {
                active: active.len(),
                max: self.max,
            });
        }
        if active.contains_key(clip_id) {
            return Err(WorkerError::DuplicateRender(clip_id.to_string()));
        }
        active.insert(clip_id.clone(), render_id.clone());
        debug!(clip_id = %clip_id, render_id = %render_id, "render slot claimed");
        Ok(())
    }

    /// Release the slot held for a clip. Safe to call when none is held.
    pub async fn release(&self, clip_id: &ClipId) {
        let mut active = self.active.lock().await;
        if active.remove(clip_id).is_some() {
            debug!(clip_id = %clip_id, "render slot released");
        }
    }

    /// Release the slot held by a specific render, wherever it is
    /// keyed. Covers the case where the render record was deleted and
    /// the clip id is no longer recoverable. Safe to call when the
    /// render holds no slot.
    pub async fn release_render(&self, render_id: &RenderId) {
        let mut active = self.active.lock().await;
        let clip_id = active
            .iter()
            .find_map(|(clip, render)| (render == render_id).then(|| clip.clone()));
        if let Some(clip_id) = clip_id {
            active.remove(&clip_id);
            debug!(clip_id = %clip_id, render_id = %render_id, "render slot released");
        }
    }

    /// Whether a clip currently holds a render slot.
    pub async fn is_clip_active(&self, clip_id: &ClipId) -> bool {
        self.active.lock().await.contains_key(clip_id)
    }

    /// Number of active render slots.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cap_enforced() {
        let gate = RenderGate::new(2);
        gate.try_claim(&ClipId::new(), &RenderId::new()).await.unwrap();
        gate.try_claim(&ClipId::new(), &RenderId::new()).await.unwrap();

        let err = gate
            .try_claim(&ClipId::new(), &RenderId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkerError::ConcurrencyLimit { active: 2, max: 2 }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_clip_rejected() {
        let gate = RenderGate::new(4);
        let clip = ClipId::new();
        gate.try_claim(&clip, &RenderId::new()).await.unwrap();

        let err = gate.try_claim(&clip, &RenderId::new()).await.unwrap_err();
        assert!(matches!(err, WorkerError::DuplicateRender(_)));
    }

    #[tokio::test]
    async fn test_release_frees_slot() {
        let gate = RenderGate::new(1);
        let clip = ClipId::new();
        gate.try_claim(&clip, &RenderId::new()).await.unwrap();
        assert_eq!(gate.active_count().await, 1);

        gate.release(&clip).await;
        assert_eq!(gate.active_count().await, 0);
        gate.try_claim(&ClipId::new(), &RenderId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_release_by_render_id() {
        let gate = RenderGate::new(2);
        let clip = ClipId::new();
        let render = RenderId::new();
        gate.try_claim(&clip, &render).await.unwrap();
        assert!(gate.is_clip_active(&clip).await);

        gate.release_render(&render).await;
        assert_eq!(gate.active_count().await, 0);
        assert!(!gate.is_clip_active(&clip).await);

        // Unknown render ids are a no-op.
        gate.release_render(&RenderId::new()).await;
        assert_eq!(gate.active_count().await, 0);
    }
}
