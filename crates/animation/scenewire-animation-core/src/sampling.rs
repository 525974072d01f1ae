//! Track sampling in clip seconds.
//!
//! Segments blend linearly. Pairs with no numeric blend (bool, int, text)
//! hold the left key until the right key's time.

use crate::data::{Keypoint, Track};
use crate::interp::functions::linear_value;
use scenewire_api_core::Value;

/// Find (i, i+1, local_t) for time `t`. Before the first key returns (0, 0, 0);
/// at or past the last returns (last, last, 0).
fn find_segment(points: &[Keypoint], t: f32) -> (usize, usize, f32) {
    let n = points.len();
    if n <= 1 || t <= points[0].time {
        return (0, 0, 0.0);
    }
    if t >= points[n - 1].time {
        return (n - 1, n - 1, 0.0);
    }
    // First index whose time exceeds t; guaranteed in 1..n here.
    let hi = points.partition_point(|p| p.time <= t);
    let lo = hi - 1;
    let t0 = points[lo].time;
    let t1 = points[hi].time;
    let denom = (t1 - t0).max(f32::EPSILON);
    (lo, hi, ((t - t0) / denom).clamp(0.0, 1.0))
}

/// Sample a track at clip time `t` (seconds). Empty tracks yield `None`.
pub fn sample_track(track: &Track, t: f32) -> Option<Value> {
    let points = &track.points;
    match points.len() {
        0 => None,
        1 => Some(points[0].value.clone()),
        _ => {
            let (i0, i1, lt) = find_segment(points, t);
            if i0 == i1 {
                return Some(points[i0].value.clone());
            }
            Some(linear_value(&points[i0].value, &points[i1].value, lt))
        }
    }
}
