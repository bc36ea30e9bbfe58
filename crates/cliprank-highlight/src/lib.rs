//! Highlight engine: turns a transcript into ranked, non-overlapping
//! highlight spans.
//!
//! Pure and synchronous. The pipeline feeds it a [`Transcript`] and
//! persists the returned highlights as clips; nothing in this crate
//! touches storage or the filesystem.

pub mod config;
pub mod generate;
pub mod keywords;
pub mod params;
pub mod score;
pub mod select;

use tracing::{info, warn};

use cliprank_models::{ClipMetadata, Transcript};

pub use config::HighlightConfig;
pub use generate::{generate_candidates, Candidate};
pub use params::desired_clip_count;
pub use score::score_span;
pub use select::resolve_overlaps;

/// A candidate that survived overlap resolution and was given a title.
#[derive(Debug, Clone)]
pub struct Highlight {
    /// Span start in seconds
    pub start: f64,
    /// Span end in seconds
    pub end: f64,
    /// Span duration in seconds
    pub duration: f64,
    /// Final score
    pub score: f64,
    /// Human-readable title
    pub title: String,
    /// Truncated transcript snippet
    pub snippet: String,
    /// Scoring metadata (categories, word count, question, segment count)
    pub metadata: ClipMetadata,
}

const SNIPPET_MAX_CHARS: usize = 200;

/// Generate ranked highlights from a transcript.
///
/// `top_n = None` auto-calculates the clip count from the video duration.
/// `adaptive` enables coarse window stepping on long videos.
///
/// Returns an empty vector when the transcript has no segments or no
/// candidate fits the duration bounds; the caller decides whether that
/// is an error.
pub fn generate_highlights(
    transcript: &Transcript,
    top_n: Option<usize>,
    adaptive: bool,
    cfg: &HighlightConfig,
) -> Vec<Highlight> {
    let segments = &transcript.segments;
    let total_duration = transcript.duration_secs;

    if segments.is_empty() {
        warn!("no segments in transcript, skipping highlight generation");
        return Vec::new();
    }

    let top_n =
        top_n.unwrap_or_else(|| desired_clip_count(total_duration, cfg.default_clip_count));

    info!(
        duration_secs = total_duration,
        segments = segments.len(),
        target_clips = top_n,
        adaptive,
        "highlight generation started"
    );

    let candidates = generate_candidates(segments, total_duration, adaptive, cfg);
    if candidates.is_empty() {
        warn!("no valid candidates generated");
        return Vec::new();
    }

    let selected = resolve_overlaps(candidates, top_n, cfg.min_gap);
    if selected.is_empty() {
        warn!("no highlights left after overlap resolution");
        return Vec::new();
    }

    let highlights: Vec<Highlight> = selected
        .into_iter()
        .enumerate()
        .map(|(i, c)| Highlight {
            start: c.start,
            end: c.end,
            duration: c.duration,
            score: c.score,
            title: title_for(i, &c.metadata),
            snippet: snippet_for(&c.text),
            metadata: c.metadata,
        })
        .collect();

    info!(count = highlights.len(), "highlight generation complete");
    highlights
}

/// Title a highlight from its rank and the first matched category.
fn title_for(index: usize, metadata: &ClipMetadata) -> String {
    let base = format!("Highlight {}", index + 1);
    let hint = match metadata.categories.first().map(String::as_str) {
        Some("importance") => Some("(Important)"),
        Some("revelation") => Some("(Key Point)"),
        Some("teaching") => Some("(Tutorial)"),
        _ => None,
    };
    match hint {
        Some(h) => format!("{} {}", base, h),
        None => base,
    }
}

/// First 200 chars of the span text, char-boundary safe.
fn snippet_for(text: &str) -> String {
    if text.chars().count() <= SNIPPET_MAX_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliprank_models::TranscriptSegment;

    fn segments_of(count: usize, seg_len: f64) -> Vec<TranscriptSegment> {
        (0..count)
            .map(|i| {
                TranscriptSegment::new(
                    i as f64 * seg_len,
                    (i + 1) as f64 * seg_len,
                    format!("segment {} with some ordinary spoken words", i),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_transcript_yields_nothing() {
        let transcript = Transcript::new("en", 0.0, vec![]);
        let cfg = HighlightConfig::default();
        assert!(generate_highlights(&transcript, None, true, &cfg).is_empty());
    }

    #[test]
    fn test_600s_video_with_keyword_hits() {
        // 600s video, 30 segments of 20s each, keyword hit every 5th segment.
        let cfg = HighlightConfig::default();
        let mut segments = segments_of(30, 20.0);
        for (i, seg) in segments.iter_mut().enumerate() {
            if i % 5 == 0 {
                seg.text = format!("this is important, a secret trick you must know {}", i);
            }
        }
        let transcript = Transcript::new("en", 600.0, segments);

        let highlights = generate_highlights(&transcript, None, true, &cfg);
        assert!(!highlights.is_empty());
        assert!(highlights.len() <= 15);
        for h in &highlights {
            assert!(h.duration >= cfg.min_duration && h.duration <= cfg.max_duration);
            assert!(!h.title.is_empty());
        }
    }

    #[test]
    fn test_highlights_sorted_by_start() {
        let cfg = HighlightConfig::default();
        let transcript = Transcript::new("en", 600.0, segments_of(30, 20.0));
        let highlights = generate_highlights(&transcript, Some(5), false, &cfg);
        for pair in highlights.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "word ".repeat(100);
        let snippet = snippet_for(&long);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS + 3);

        assert_eq!(snippet_for("short text"), "short text");
    }

    #[test]
    fn test_title_category_hints() {
        let mut metadata = ClipMetadata::default();
        assert_eq!(title_for(0, &metadata), "Highlight 1");

        metadata.categories = vec!["importance".to_string()];
        assert_eq!(title_for(1, &metadata), "Highlight 2 (Important)");

        metadata.categories = vec!["teaching".to_string()];
        assert_eq!(title_for(2, &metadata), "Highlight 3 (Tutorial)");
    }
}
