//! Timeout scaling for external-tool calls.
//!
//! Timeouts grow with the estimated input size and are hard-capped per
//! attempt, so one oversized input cannot hold a worker slot forever.

use std::path::Path;
use std::time::Duration;

use crate::config::WorkerConfig;

/// Transcription timeout scaled by the video file size. Falls back to
/// the floor when the size cannot be read.
pub fn transcribe_timeout(cfg: &WorkerConfig, video: &Path) -> Duration {
    let size_mb = std::fs::metadata(video)
        .map(|m| m.len() / (1024 * 1024))
        .unwrap_or(0);
    scale(
        cfg.transcribe_timeout_per_mb,
        size_mb,
        cfg.transcribe_timeout_floor,
        cfg.transcribe_timeout_ceiling,
    )
}

/// Render timeout scaled by the clip length in seconds.
pub fn render_timeout(cfg: &WorkerConfig, clip_secs: f64) -> Duration {
    scale(
        cfg.render_timeout_per_sec,
        clip_secs.max(0.0) as u64,
        cfg.render_timeout_floor,
        cfg.render_timeout_ceiling,
    )
}

fn scale(per_unit: Duration, units: u64, floor: Duration, ceiling: Duration) -> Duration {
    per_unit
        .saturating_mul(units.min(u32::MAX as u64) as u32)
        .clamp(floor, ceiling)
}
