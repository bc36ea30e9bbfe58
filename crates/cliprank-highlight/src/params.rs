//! Parameter calculator: video duration to desired clip count.

const CLIP_COUNT_CAP: usize = 50;

/// Desired number of clips for a video, a monotone step function of its
/// length. Longer videos get more slots, capped so pathological inputs
/// cannot explode candidate selection.
pub fn desired_clip_count(duration_secs: f64, base_count: usize) -> usize {
    let minutes = duration_secs / 60.0;

    if minutes <= 10.0 {
        base_count.max(5)
    } else if minutes <= 30.0 {
        base_count.max(12)
    } else if minutes <= 60.0 {
        base_count.max(20)
    } else if minutes <= 120.0 {
        base_count.max(30)
    } else {
        ((minutes / 3.0) as usize).min(CLIP_COUNT_CAP)
    }
}
