//! Line rasterization in image space

use crate::camera::ImagePoint;

/// Sample positions along the segment `a -> b` with a DDA.
///
/// The step count is `ceil(max(|dx|, |dy|))`, both endpoints are always
/// included, and the samples are computed from a canonical endpoint order so
/// that `plot_line(a, b)` and `plot_line(b, a)` cover the same cells. The result
/// runs from `a` to `b`. Returns `None` if an endpoint is not finite or the line
/// needs more than `max_steps` steps.
pub fn plot_line(a: ImagePoint, b: ImagePoint, max_steps: usize) -> Option<Vec<ImagePoint>> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }

    let swapped = (b.x, b.y) < (a.x, a.y);
    let (start, end) = if swapped { (b, a) } else { (a, b) };

    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let span = dx.abs().max(dy.abs()).ceil();
    if span > max_steps as f64 {
        return None;
    }
    let steps = span as usize;

    let mut samples = Vec::with_capacity(steps + 1);
    samples.push(start);
    if steps > 0 {
        let step_x = dx / steps as f64;
        let step_y = dy / steps as f64;
        for i in 1..steps {
            samples.push(ImagePoint::new(
                start.x + step_x * i as f64,
                start.y + step_y * i as f64,
            ));
        }
        // exact endpoint, no accumulated rounding
        samples.push(end);
    }

    if swapped {
        samples.reverse();
    }
    Some(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn cells(points: &[ImagePoint]) -> BTreeSet<(i64, i64)> {
        points
            .iter()
            .map(|p| (p.x.floor() as i64, p.y.floor() as i64))
            .collect()
    }

    #[test]
    fn horizontal_line_covers_every_column() {
        let points = plot_line(ImagePoint::new(0.0, 0.0), ImagePoint::new(10.0, 0.0), 1000).unwrap();
        assert_eq!(points.len(), 11);
        let expected: BTreeSet<_> = (0..=10).map(|x| (x, 0)).collect();
        assert_eq!(cells(&points), expected);
    }

    #[test]
    fn line_is_symmetric_and_endpoint_inclusive() {
        let cases = [
            (ImagePoint::new(0.3, 0.7), ImagePoint::new(13.9, 5.2)),
            (ImagePoint::new(-4.5, 8.0), ImagePoint::new(3.25, -9.75)),
            (ImagePoint::new(2.0, 2.0), ImagePoint::new(2.0, 17.0)),
            (ImagePoint::new(7.1, 3.3), ImagePoint::new(7.1, 3.3)),
        ];

        for (a, b) in cases {
            let forward = plot_line(a, b, 1000).unwrap();
            let backward = plot_line(b, a, 1000).unwrap();
            assert_eq!(cells(&forward), cells(&backward));

            assert_eq!(forward.first(), Some(&a));
            assert_eq!(forward.last(), Some(&b));
            assert_eq!(backward.first(), Some(&b));
            assert_eq!(backward.last(), Some(&a));
        }
    }

    #[test]
    fn degenerate_line_is_a_single_sample() {
        let p = ImagePoint::new(1.5, 1.5);
        assert_eq!(plot_line(p, p, 10).unwrap(), vec![p]);
    }

    #[test]
    fn oversized_or_non_finite_lines_are_rejected() {
        let origin = ImagePoint::new(0.0, 0.0);
        assert!(plot_line(origin, ImagePoint::new(1e9, 0.0), 4096).is_none());
        assert!(plot_line(origin, ImagePoint::new(f64::INFINITY, 0.0), 4096).is_none());
        assert!(plot_line(ImagePoint::new(f64::NAN, 0.0), origin, 4096).is_none());
    }
}
