//! Largest-triangle-three-buckets down-sampling for plot views.

use crate::averaging::{AveragingBuffer, Sample, SampleView};

/// Reduce `points` to at most `threshold` representative points.
///
/// The first and last points are always kept. The interior is split into
/// `threshold - 2` buckets; each bucket keeps the point forming the
/// largest triangle with the previously selected point and the centroid
/// of the next bucket. Input order is preserved.
///
/// Inputs shorter than the threshold, or thresholds below 3, are returned
/// unchanged.
#[must_use]
pub fn largest_triangle_three_buckets(
    points: &[(f64, f64)],
    threshold: usize,
) -> Vec<(f64, f64)> {
    if threshold >= points.len() || threshold < 3 {
        return points.to_vec();
    }

    let mut sampled = Vec::with_capacity(threshold);
    sampled.push(points[0]);

    // Interior points bucketed evenly; the endpoints stay out of buckets.
    let every = (points.len() - 2) as f64 / (threshold - 2) as f64;
    let mut selected = 0_usize;

    for bucket in 0..threshold - 2 {
        // Centroid of the next bucket, clamped into range at the end.
        let next_start = ((bucket + 1) as f64).mul_add(every, 1.0) as usize;
        let next_end = (((bucket + 2) as f64).mul_add(every, 1.0) as usize).min(points.len());
        let (centroid_x, centroid_y) = if next_start < next_end {
            let span = (next_end - next_start) as f64;
            let (sum_x, sum_y) = points[next_start..next_end]
                .iter()
                .fold((0.0, 0.0), |(x, y), p| (x + p.0, y + p.1));
            (sum_x / span, sum_y / span)
        } else {
            points[points.len() - 1]
        };

        let start = (bucket as f64).mul_add(every, 1.0) as usize;
        let end = ((bucket + 1) as f64).mul_add(every, 1.0) as usize;
        let anchor = points[selected];

        let mut best = start;
        let mut best_area = -1.0_f64;
        for (offset, point) in points[start..end].iter().enumerate() {
            let area = ((anchor.0 - centroid_x) * (point.1 - anchor.1)
                - (anchor.0 - point.0) * (centroid_y - anchor.1))
                .abs()
                * 0.5;
            if area > best_area {
                best_area = area;
                best = start + offset;
            }
        }

        sampled.push(points[best]);
        selected = best;
    }

    sampled.push(points[points.len() - 1]);
    sampled
}

impl<T: Sample> AveragingBuffer<T> {
    /// Down-sample the window to `threshold` plot points.
    ///
    /// Points are `(sample index, value)` with index 0 at the oldest
    /// visible sample.
    #[must_use]
    pub fn downsample(&self, threshold: usize, view: SampleView) -> Vec<(f64, f64)> {
        let points: Vec<(f64, f64)> = self
            .values(view)
            .enumerate()
            .map(|(i, value)| (i as f64, value.as_f64()))
            .collect();
        largest_triangle_three_buckets(&points, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_inputs_pass_through() {
        let points: Vec<(f64, f64)> = (0..4).map(|i| (f64::from(i), 1.0)).collect();
        assert_eq!(largest_triangle_three_buckets(&points, 10), points);
        assert_eq!(largest_triangle_three_buckets(&points, 2), points);
    }

    #[test]
    fn selects_maximal_area_points() {
        // Ten points, threshold 6: four interior buckets of exactly two
        // points each. Spikes at x = 2 and x = 6 must survive.
        let ys = [0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0];
        let points: Vec<(f64, f64)> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();

        let sampled = largest_triangle_three_buckets(&points, 6);
        assert_eq!(
            sampled,
            vec![
                (0.0, 0.0),
                (2.0, 10.0),
                (3.0, 0.0),
                (6.0, 5.0),
                (7.0, 0.0),
                (9.0, 0.0)
            ]
        );
    }

    #[test]
    fn endpoints_always_survive() {
        let points: Vec<(f64, f64)> = (0..100)
            .map(|i| (f64::from(i), f64::from(i % 7)))
            .collect();
        let sampled = largest_triangle_three_buckets(&points, 12);
        assert_eq!(sampled.len(), 12);
        assert_eq!(sampled[0], points[0]);
        assert_eq!(sampled[11], points[99]);
    }

    #[test]
    fn buffer_downsample_uses_window_order() {
        let mut buffer = AveragingBuffer::new(8);
        for value in [1.0_f32, 2.0, 3.0, 4.0] {
            buffer.push(value);
        }
        let points = buffer.downsample(16, SampleView::Raw);
        assert_eq!(
            points,
            vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0)]
        );
    }
}
