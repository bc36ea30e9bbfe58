//! Candidate scoring.
//!
//! Four additive components, roughly 100 points max:
//! - hook keywords, weighted by category and capped at 35
//! - content quality: vocabulary diversity, word-count sweet spot, questions
//! - duration fit, tiered within the allowed range
//! - position bonus for openers, closers and the temporal middle

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use cliprank_models::ClipMetadata;

use crate::config::HighlightConfig;
use crate::keywords::{contains_question, detect_keyword_categories};

const KEYWORD_CAP: f64 = 35.0;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Score a candidate span.
///
/// `segment_index`/`total_segments` locate the span within the video for
/// the position bonus. The returned metadata leaves `segment_count` at
/// zero; the generator fills it in.
pub fn score_span(
    text: &str,
    start: f64,
    end: f64,
    segment_index: usize,
    total_segments: usize,
    cfg: &HighlightConfig,
) -> (f64, ClipMetadata) {
    let text_lower = text.to_lowercase();
    let duration = end - start;
    let mut score = 0.0;
    let mut metadata = ClipMetadata::default();

    // 1. Hook keywords, per-category contribution capped at twice the weight.
    let hits = detect_keyword_categories(&text_lower);
    metadata.categories = hits.iter().map(|(name, _, _)| name.to_string()).collect();
    let keyword_score: f64 = hits
        .iter()
        .map(|(_, count, weight)| (*count as f64 * weight).min(weight * 2.0))
        .sum();
    score += keyword_score.min(KEYWORD_CAP);

    // 2. Content quality.
    let words: Vec<&str> = WORD_RE.find_iter(&text_lower).map(|m| m.as_str()).collect();
    metadata.word_count = words.len();

    if !words.is_empty() {
        let unique: HashSet<&str> = words.iter().copied().collect();
        let unique_ratio = unique.len() as f64 / words.len() as f64;
        score += unique_ratio * 15.0;

        // Sweet spot: 50-150 words reads well as a short clip.
        match words.len() {
            50..=150 => score += 5.0,
            30..=200 => score += 3.0,
            _ => {}
        }
    }

    if contains_question(&text_lower) {
        metadata.has_question = true;
        score += 5.0;
    }

    // 3. Duration fit, only within the allowed range.
    if duration >= cfg.min_duration && duration <= cfg.max_duration {
        if (20.0..=45.0).contains(&duration) {
            score += 25.0;
        } else if (15.0..=60.0).contains(&duration) {
            score += 20.0;
        } else {
            score += 15.0;
        }
    }

    // 4. Position bonus: strong starts and endings are memorable.
    if total_segments > 0 {
        let position_ratio = segment_index as f64 / total_segments as f64;
        if position_ratio < 0.15 || position_ratio > 0.85 {
            score += 10.0;
        } else if (0.4..=0.6).contains(&position_ratio) {
            score += 8.0;
        } else {
            score += 5.0;
        }
    }

    (score, metadata)
}
