//! Overlap resolution: greedy, score-first selection of a
//! non-overlapping candidate subset.
//!
//! Deliberately not a weighted-interval-scheduling optimum; the greedy
//! pass keeps the single best candidates and stays deterministic.

use tracing::info;

use crate::generate::Candidate;

/// Select up to `top_n` non-overlapping candidates.
///
/// Candidates are visited in descending score order (stable on ties) and
/// accepted only when they keep at least `min_gap` seconds between
/// themselves and every already-accepted span. The result is re-sorted
/// ascending by start time.
pub fn resolve_overlaps(
    mut candidates: Vec<Candidate>,
    top_n: usize,
    min_gap: f64,
) -> Vec<Candidate> {
    let total = candidates.len();

    // Stable sort keeps original generation order on equal scores.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut selected: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if selected.len() >= top_n {
            break;
        }
        let compatible = selected.iter().all(|sel| {
            candidate.end <= sel.start - min_gap || candidate.start >= sel.end + min_gap
        });
        if compatible {
            selected.push(candidate);
        }
    }

    selected.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(
        selected = selected.len(),
        candidates = total,
        "overlap resolution complete"
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliprank_models::ClipMetadata;

    fn candidate(start: f64, end: f64, score: f64) -> Candidate {
        Candidate {
            start,
            end,
            duration: end - start,
            score,
            text: String::new(),
            metadata: ClipMetadata::default(),
        }
    }

    #[test]
    fn test_higher_score_wins_overlap() {
        // A={0,30,80}, B={10,40,90}: overlapping, min_gap 10 -> only B survives.
        let selected = resolve_overlaps(
            vec![candidate(0.0, 30.0, 80.0), candidate(10.0, 40.0, 90.0)],
            10,
            10.0,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].score, 90.0);
        assert_eq!(selected[0].start, 10.0);
    }

    #[test]
    fn test_respects_min_gap_on_both_sides() {
        // Follows the winner but only 5s after it ends: rejected.
        let selected = resolve_overlaps(
            vec![candidate(0.0, 30.0, 90.0), candidate(35.0, 60.0, 80.0)],
            10,
            10.0,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].score, 90.0);

        // Precedes the winner but ends only 5s before it starts: rejected.
        let selected = resolve_overlaps(
            vec![candidate(25.0, 55.0, 90.0), candidate(0.0, 20.0, 80.0)],
            10,
            10.0,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].score, 90.0);

        // A full gap on the trailing side: both survive.
        let selected = resolve_overlaps(
            vec![candidate(0.0, 30.0, 90.0), candidate(40.0, 65.0, 80.0)],
            10,
            10.0,
        );
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_gap_holds_between_all_selected_pairs() {
        let candidates: Vec<Candidate> = (0..20)
            .map(|i| candidate(i as f64 * 17.0, i as f64 * 17.0 + 25.0, 50.0 + i as f64))
            .collect();
        let selected = resolve_overlaps(candidates, 10, 10.0);

        assert!(!selected.is_empty());
        for pair in selected.windows(2) {
            assert!(pair[1].start >= pair[0].end + 10.0);
        }
    }

    #[test]
    fn test_caps_at_top_n_and_sorts_by_start() {
        let candidates: Vec<Candidate> = (0..10)
            .map(|i| candidate(i as f64 * 100.0, i as f64 * 100.0 + 30.0, i as f64))
            .collect();
        let selected = resolve_overlaps(candidates, 3, 10.0);
        assert_eq!(selected.len(), 3);
        for pair in selected.windows(2) {
            assert!(pair[0].start < pair[1].start);
        }
    }

    #[test]
    fn test_stable_on_score_ties() {
        // Equal scores: the earlier-generated candidate is visited first.
        let selected = resolve_overlaps(
            vec![candidate(0.0, 30.0, 50.0), candidate(5.0, 35.0, 50.0)],
            10,
            10.0,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].start, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(Vec::new(), 5, 10.0).is_empty());
    }
}
