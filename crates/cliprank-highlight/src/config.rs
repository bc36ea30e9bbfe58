//! Highlight engine configuration.

/// Tunables for candidate generation and selection.
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Minimum clip duration in seconds
    pub min_duration: f64,
    /// Maximum clip duration in seconds
    pub max_duration: f64,
    /// Base clip count when the caller does not ask for a specific number
    pub default_clip_count: usize,
    /// Minimum gap between selected highlights in seconds
    pub min_gap: f64,
    /// Videos longer than this use the adaptive generation step
    pub long_video_threshold: f64,
    /// Window start stride on long videos (1 = every segment)
    pub adaptive_step: usize,
    /// Maximum segments per generation window (performance guard)
    pub max_window: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            min_duration: 15.0,
            max_duration: 60.0,
            default_clip_count: 12,
            min_gap: 10.0,
            long_video_threshold: 3600.0,
            adaptive_step: 3,
            max_window: 150,
        }
    }
}

impl HighlightConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_duration: env_f64("CLIPRANK_MIN_CLIP_DURATION", defaults.min_duration),
            max_duration: env_f64("CLIPRANK_MAX_CLIP_DURATION", defaults.max_duration),
            default_clip_count: env_usize("CLIPRANK_DEFAULT_CLIP_COUNT", defaults.default_clip_count),
            min_gap: env_f64("CLIPRANK_MIN_CLIP_GAP", defaults.min_gap),
            ..defaults
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
