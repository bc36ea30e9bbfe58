//! Candidate generation: sliding windows over transcript segments.

use tracing::{debug, info};

use cliprank_models::{ClipMetadata, TranscriptSegment};

use crate::config::HighlightConfig;
use crate::score::score_span;

/// An ephemeral scored span, consumed by the overlap resolver.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Span start in seconds
    pub start: f64,
    /// Span end in seconds
    pub end: f64,
    /// Span duration in seconds
    pub duration: f64,
    /// Score from [`score_span`]
    pub score: f64,
    /// Concatenated segment text
    pub text: String,
    /// Scoring metadata with `segment_count` filled in
    pub metadata: ClipMetadata,
}

/// Generate all feasible candidate spans within the duration bounds.
///
/// The window start index steps by `adaptive_step` on videos longer than
/// `long_video_threshold` (when `adaptive` is set), which trades
/// candidate density for bounded generation cost. Every emitted
/// candidate has `duration` in `[min_duration, max_duration]`.
pub fn generate_candidates(
    segments: &[TranscriptSegment],
    total_duration: f64,
    adaptive: bool,
    cfg: &HighlightConfig,
) -> Vec<Candidate> {
    let total_segments = segments.len();
    let is_long_video = total_duration > cfg.long_video_threshold;
    let step = if is_long_video && adaptive {
        cfg.adaptive_step.max(1)
    } else {
        1
    };

    debug!(
        total_segments,
        step, is_long_video, "generating candidate spans"
    );

    let mut candidates = Vec::new();
    let mut i = 0;
    while i < total_segments {
        // Window-size ceiling keeps generation bounded on dense transcripts.
        let max_j = (i + cfg.max_window).min(total_segments);

        for j in (i + 1)..=max_j {
            let start = segments[i].start;
            let end = segments[j - 1].end;
            let duration = end - start;

            if duration < cfg.min_duration {
                continue;
            }
            if duration > cfg.max_duration {
                break;
            }

            let text = segments[i..j]
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let (score, mut metadata) = score_span(&text, start, end, i, total_segments, cfg);
            metadata.segment_count = j - i;

            candidates.push(Candidate {
                start,
                end,
                duration,
                score,
                text,
                metadata,
            });
        }

        i += step;
    }

    info!(count = candidates.len(), "generated candidate spans");
    candidates
}
