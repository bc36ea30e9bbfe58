//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use cliprank_highlight::HighlightConfig;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Worker pool size (concurrent job/render executions)
    pub max_workers: usize,
    /// Global cap on renders in queued/processing
    pub max_concurrent_renders: usize,
    /// Root of the artifact directory tree
    pub data_dir: PathBuf,
    /// Hard timeout for one download attempt
    pub download_timeout: Duration,
    /// Transcription timeout per megabyte of input video
    pub transcribe_timeout_per_mb: Duration,
    /// Transcription timeout floor per attempt
    pub transcribe_timeout_floor: Duration,
    /// Transcription timeout ceiling per attempt
    pub transcribe_timeout_ceiling: Duration,
    /// Render timeout per second of clip length
    pub render_timeout_per_sec: Duration,
    /// Render timeout floor per attempt
    pub render_timeout_floor: Duration,
    /// Render timeout ceiling per attempt
    pub render_timeout_ceiling: Duration,
    /// Highlight engine tunables
    pub highlight: HighlightConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_workers: 2,
            max_concurrent_renders: 2,
            data_dir: PathBuf::from("data"),
            download_timeout: Duration::from_secs(600),
            transcribe_timeout_per_mb: Duration::from_secs(3),
            transcribe_timeout_floor: Duration::from_secs(120),
            transcribe_timeout_ceiling: Duration::from_secs(1800),
            render_timeout_per_sec: Duration::from_secs(10),
            render_timeout_floor: Duration::from_secs(60),
            render_timeout_ceiling: Duration::from_secs(900),
            highlight: HighlightConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_workers: env_usize("CLIPRANK_MAX_WORKERS", defaults.max_workers),
            max_concurrent_renders: env_usize(
                "CLIPRANK_MAX_RENDERS",
                defaults.max_concurrent_renders,
            ),
            data_dir: std::env::var("CLIPRANK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            download_timeout: env_secs("CLIPRANK_DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout),
            transcribe_timeout_per_mb: env_secs(
                "CLIPRANK_TRANSCRIBE_TIMEOUT_PER_MB_SECS",
                defaults.transcribe_timeout_per_mb,
            ),
            transcribe_timeout_floor: env_secs(
                "CLIPRANK_TRANSCRIBE_TIMEOUT_FLOOR_SECS",
                defaults.transcribe_timeout_floor,
            ),
            transcribe_timeout_ceiling: env_secs(
                "CLIPRANK_TRANSCRIBE_TIMEOUT_CEILING_SECS",
                defaults.transcribe_timeout_ceiling,
            ),
            render_timeout_per_sec: env_secs(
                "CLIPRANK_RENDER_TIMEOUT_PER_SEC_SECS",
                defaults.render_timeout_per_sec,
            ),
            render_timeout_floor: env_secs(
                "CLIPRANK_RENDER_TIMEOUT_FLOOR_SECS",
                defaults.render_timeout_floor,
            ),
            render_timeout_ceiling: env_secs(
                "CLIPRANK_RENDER_TIMEOUT_CEILING_SECS",
                defaults.render_timeout_ceiling,
            ),
            highlight: HighlightConfig::from_env(),
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
