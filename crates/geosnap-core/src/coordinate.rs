//! Coordinate primitives and the closed-form geometry helpers used by the
//! snap search.
//!
//! Coordinates are plain `[x, y]` pairs so they serialize the same way map
//! documents store them.

use std::f64::consts::TAU;

/// A position in data (map) space.
pub type Coordinate = [f64; 2];

/// A position in screen space, y pointing down.
pub type Pixel = [f64; 2];

/// Default number of sides used when a circle is approximated by a polygon.
pub const DEFAULT_CIRCLE_SIDES: usize = 32;

/// Squared euclidean distance between two coordinates.
#[inline]
pub fn squared_distance(a: Coordinate, b: Coordinate) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Returns true if both components are finite.
#[inline]
pub fn is_finite(c: Coordinate) -> bool {
    c[0].is_finite() && c[1].is_finite()
}

/// Closest point to `point` on the segment `[start, end]`.
///
/// A zero-length segment returns its shared endpoint.
pub fn closest_on_segment(point: Coordinate, segment: [Coordinate; 2]) -> Coordinate {
    let [start, end] = segment;
    let dx = end[0] - start[0];
    let dy = end[1] - start[1];
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return start;
    }

    let t = ((point[0] - start[0]) * dx + (point[1] - start[1]) * dy) / len_sq;
    if t <= 0.0 {
        start
    } else if t >= 1.0 {
        end
    } else {
        [start[0] + t * dx, start[1] + t * dy]
    }
}

/// Closest point to `point` on the boundary of a circle.
///
/// When `point` sits exactly on the center every boundary point is equally
/// close; the point on the positive x axis is returned.
pub fn closest_on_circle(point: Coordinate, center: Coordinate, radius: f64) -> Coordinate {
    let mut dx = point[0] - center[0];
    let dy = point[1] - center[1];
    if dx == 0.0 && dy == 0.0 {
        dx = 1.0;
    }
    let d = dx.hypot(dy);
    [center[0] + radius * dx / d, center[1] + radius * dy / d]
}

/// Closed ring approximating a circle with `sides` edges.
///
/// The first vertex lies at angle zero and is repeated at the end, so the
/// ring has `sides + 1` coordinates.
pub fn circle_to_ring(center: Coordinate, radius: f64, sides: usize) -> Vec<Coordinate> {
    let sides = sides.max(3);
    let mut ring = Vec::with_capacity(sides + 1);
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / sides as f64;
    for i in 0..sides {
        #[allow(clippy::cast_precision_loss)]
        let angle = step * i as f64;
        ring.push([
            center[0] + radius * angle.cos(),
            center[1] + radius * angle.sin(),
        ]);
    }
    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_on_segment_projects_inside() {
        let p = closest_on_segment([5.0, 3.0], [[0.0, 0.0], [10.0, 0.0]]);
        assert!((p[0] - 5.0).abs() < 1e-12);
        assert!(p[1].abs() < 1e-12);
    }

    #[test]
    fn test_closest_on_segment_clamps_to_endpoints() {
        let seg = [[0.0, 0.0], [10.0, 0.0]];
        assert_eq!(closest_on_segment([-4.0, 1.0], seg), [0.0, 0.0]);
        assert_eq!(closest_on_segment([14.0, -2.0], seg), [10.0, 0.0]);
    }

    #[test]
    fn test_closest_on_degenerate_segment() {
        let p = closest_on_segment([3.0, 4.0], [[1.0, 1.0], [1.0, 1.0]]);
        assert_eq!(p, [1.0, 1.0]);
    }

    #[test]
    fn test_closest_on_circle() {
        let p = closest_on_circle([20.0, 0.0], [0.0, 0.0], 10.0);
        assert!((p[0] - 10.0).abs() < 1e-12);
        assert!(p[1].abs() < 1e-12);

        let p = closest_on_circle([3.0, 4.0], [0.0, 0.0], 10.0);
        assert!((p[0] - 6.0).abs() < 1e-12);
        assert!((p[1] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_closest_on_circle_from_center() {
        let p = closest_on_circle([2.0, 2.0], [2.0, 2.0], 5.0);
        assert_eq!(p, [7.0, 2.0]);
    }

    #[test]
    fn test_circle_to_ring_is_closed() {
        let ring = circle_to_ring([0.0, 0.0], 10.0, 32);
        assert_eq!(ring.len(), 33);
        assert_eq!(ring.first(), ring.last());
        assert!((ring[0][0] - 10.0).abs() < 1e-12);
        for c in &ring {
            assert!((c[0].hypot(c[1]) - 10.0).abs() < 1e-9);
        }
    }
}
