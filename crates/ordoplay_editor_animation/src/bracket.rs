// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loop-aware keyframe bracketing.

/// The two keyframes surrounding a query frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Index of the keyframe at or before the query
    pub prev: usize,
    /// Index of the keyframe after the query
    pub next: usize,
    /// Blend factor from `prev` to `next`, in `[0, 1]`
    pub t: f32,
}

/// Find the keyframes surrounding `frame` in a looping timeline.
///
/// `frames` must be sorted ascending. `next` is the first key strictly after
/// `frame` and `prev` its predecessor; past the last key (or before the first)
/// the pair wraps to `(last, first)` and the span crosses the loop boundary.
pub fn bracket(frames: &[u32], frame: f32, duration: f32) -> Option<Bracket> {
    let last = frames.len().checked_sub(1)?;

    let (prev, next) = match frames.iter().position(|&k| k as f32 > frame) {
        Some(0) | None => (last, 0),
        Some(i) => (i - 1, i),
    };

    let prev_frame = frames[prev] as f32;
    let mut next_frame = frames[next] as f32;
    if next_frame <= prev_frame {
        next_frame += duration;
    }

    let mut query = frame;
    if query < prev_frame {
        query += duration;
    }

    let span = next_frame - prev_frame;
    let t = if span > 0.0 {
        ((query - prev_frame) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(Bracket { prev, next, t })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_empty_has_no_bracket() {
        assert_eq!(bracket(&[], 3.0, 100.0), None);
    }

    #[test]
    fn test_exact_key_gives_zero_t() {
        let b = bracket(&[0, 50], 0.0, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (0, 1));
        assert_eq!(b.t, 0.0);
    }

    #[test]
    fn test_interior_segment() {
        let b = bracket(&[0, 40, 80], 60.0, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (1, 2));
        assert!((b.t - 0.5).abs() < EPS);
    }

    #[test]
    fn test_end_of_list_wraps_to_first() {
        let b = bracket(&[0, 50], 75.0, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (1, 0));
        assert!((b.t - 0.5).abs() < EPS);
    }

    #[test]
    fn test_last_key_exact_boundary() {
        let b = bracket(&[0, 50], 50.0, 100.0).unwrap();
        // Same rotation as (0, 1) at t = 1: both land exactly on key 1
        assert_eq!((b.prev, b.next), (1, 0));
        assert_eq!(b.t, 0.0);
    }

    #[test]
    fn test_segment_end_reaches_one() {
        // Just short of the next key on an interior segment
        let b = bracket(&[10, 20], 19.999, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (0, 1));
        assert!((b.t - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_start_of_list_wraps_from_last() {
        // Before the first key the query lies in the wrapped segment 60 -> 110
        let b = bracket(&[10, 60], 5.0, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (1, 0));
        assert!((b.t - 0.9).abs() < EPS);
    }

    #[test]
    fn test_single_key_spans_whole_loop() {
        let b = bracket(&[30], 80.0, 100.0).unwrap();
        assert_eq!((b.prev, b.next), (0, 0));
        assert!((b.t - 0.5).abs() < EPS);
    }
}
