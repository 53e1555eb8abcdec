//! Decomposition of geometries into indexable segments.
//!
//! Every geometry variant maps to an ordered run of two-point segments
//! (one-point segments for point geometries). The match is exhaustive, so a
//! new [`Geometry`] variant does not compile until it has a rule here.

use serde::{Deserialize, Serialize};

use crate::coordinate::{self, Coordinate, DEFAULT_CIRCLE_SIDES, circle_to_ring};
use crate::extent::Extent;
use crate::geometry::Geometry;
use crate::view::SearchProjection;

/// The minimal linear unit stored in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum Segment {
    Point(Coordinate),
    Line([Coordinate; 2]),
}

impl Segment {
    /// Vertices of the segment, in order.
    pub fn vertices(&self) -> &[Coordinate] {
        match self {
            Self::Point(p) => std::slice::from_ref(p),
            Self::Line(pair) => pair.as_slice(),
        }
    }

    /// Endpoints if this is a two-point segment.
    pub fn as_line(&self) -> Option<[Coordinate; 2]> {
        match self {
            Self::Point(_) => None,
            Self::Line(pair) => Some(*pair),
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::bounding(self.vertices())
    }

    pub fn is_finite(&self) -> bool {
        self.vertices().iter().all(|c| coordinate::is_finite(*c))
    }
}

/// Turns geometries into segments.
///
/// Circles are approximated by a closed polygon built in the search
/// projection and mapped back to user space for storage.
#[derive(Debug, Clone, Copy)]
pub struct Segmenter<'a> {
    projection: SearchProjection<'a>,
    circle_sides: usize,
}

impl Default for Segmenter<'_> {
    fn default() -> Self {
        Self::new(SearchProjection::native(), DEFAULT_CIRCLE_SIDES)
    }
}

impl<'a> Segmenter<'a> {
    pub fn new(projection: SearchProjection<'a>, circle_sides: usize) -> Self {
        Self {
            projection,
            circle_sides,
        }
    }

    /// Segments of `geometry` in deterministic order.
    pub fn segment(&self, geometry: &Geometry) -> Vec<Segment> {
        let mut out = Vec::new();
        self.write(geometry, &mut out);
        out
    }

    fn write(&self, geometry: &Geometry, out: &mut Vec<Segment>) {
        match geometry {
            Geometry::Point { coordinates } => out.push(Segment::Point(*coordinates)),
            Geometry::LineString { coordinates } | Geometry::LinearRing { coordinates } => {
                write_line(coordinates, out);
            }
            Geometry::Polygon { rings } | Geometry::MultiLineString { lines: rings } => {
                for ring in rings {
                    write_line(ring, out);
                }
            }
            Geometry::MultiPoint { points } => {
                out.extend(points.iter().copied().map(Segment::Point));
            }
            Geometry::MultiPolygon { polygons } => {
                for ring in polygons.iter().flatten() {
                    write_line(ring, out);
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for member in geometries {
                    self.write(member, out);
                }
            }
            Geometry::Circle { center, radius } => self.write_circle(*center, *radius, out),
            Geometry::Unsupported => {}
        }
    }

    fn write_circle(&self, center: Coordinate, radius: f64, out: &mut Vec<Segment>) {
        if !coordinate::is_finite(center) || !radius.is_finite() {
            tracing::warn!(
                "[segment] Skipping circle with non-finite center {:?} or radius {}",
                center,
                radius
            );
            return;
        }
        let (view_center, view_radius) = self.projection.circle_from_user(center, radius);
        let ring: Vec<Coordinate> = circle_to_ring(view_center, view_radius, self.circle_sides)
            .into_iter()
            .map(|c| self.projection.to_user(c))
            .collect();
        write_line(&ring, out);
    }
}

/// One segment per consecutive coordinate pair; fewer than two coordinates
/// produce nothing.
fn write_line(coordinates: &[Coordinate], out: &mut Vec<Segment>) {
    out.extend(
        coordinates
            .windows(2)
            .map(|pair| Segment::Line([pair[0], pair[1]])),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ScaledProjection;

    fn segment(geometry: &Geometry) -> Vec<Segment> {
        Segmenter::default().segment(geometry)
    }

    #[test]
    fn test_point_is_singleton() {
        assert_eq!(
            segment(&Geometry::point([1.0, 2.0])),
            vec![Segment::Point([1.0, 2.0])]
        );
    }

    #[test]
    fn test_line_string_counts() {
        for n in 0..6_usize {
            #[allow(clippy::cast_precision_loss)]
            let coords: Vec<Coordinate> = (0..n).map(|i| [i as f64, 0.0]).collect();
            let segments = segment(&Geometry::line_string(coords));
            assert_eq!(segments.len(), n.saturating_sub(1), "n = {n}");
        }
    }

    #[test]
    fn test_line_string_order() {
        let segments = segment(&Geometry::line_string(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]));
        assert_eq!(
            segments,
            vec![
                Segment::Line([[0.0, 0.0], [1.0, 0.0]]),
                Segment::Line([[1.0, 0.0], [1.0, 1.0]]),
            ]
        );
    }

    #[test]
    fn test_polygon_exterior_then_holes() {
        let geometry = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 2.0]],
        ]);
        let segments = segment(&geometry);
        assert_eq!(segments.len(), 4 + 3);
        assert_eq!(segments[0], Segment::Line([[0.0, 0.0], [10.0, 0.0]]));
        assert_eq!(segments[4], Segment::Line([[2.0, 2.0], [4.0, 2.0]]));
    }

    #[test]
    fn test_multi_geometries() {
        let points = Geometry::MultiPoint {
            points: vec![[0.0, 0.0], [5.0, 5.0], [9.0, 1.0]],
        };
        assert_eq!(segment(&points).len(), 3);

        let lines = Geometry::MultiLineString {
            lines: vec![
                vec![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]],
                vec![[10.0, 10.0], [11.0, 10.0]],
            ],
        };
        assert_eq!(segment(&lines).len(), 3);

        let polygons = Geometry::MultiPolygon {
            polygons: vec![
                vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                vec![vec![[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]],
            ],
        };
        assert_eq!(segment(&polygons).len(), 6);
    }

    #[test]
    fn test_collection_recurses_and_skips_unsupported() {
        let geometry = Geometry::GeometryCollection {
            geometries: vec![
                Geometry::point([0.0, 0.0]),
                Geometry::Unsupported,
                Geometry::GeometryCollection {
                    geometries: vec![Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]])],
                },
            ],
        };
        let segments = segment(&geometry);
        assert_eq!(segments.len(), 2);
        assert!(matches!(segments[0], Segment::Point(_)));
        assert!(matches!(segments[1], Segment::Line(_)));
    }

    #[test]
    fn test_unsupported_yields_nothing() {
        assert!(segment(&Geometry::Unsupported).is_empty());
    }

    #[test]
    fn test_circle_becomes_closed_ring() {
        let segments = Segmenter::new(SearchProjection::native(), 16)
            .segment(&Geometry::circle([0.0, 0.0], 10.0));
        assert_eq!(segments.len(), 16);
        let first = segments[0].as_line().unwrap();
        let last = segments[15].as_line().unwrap();
        assert_eq!(first[0], last[1]);
    }

    #[test]
    fn test_circle_ring_stored_in_user_space() {
        let user = ScaledProjection::new(4.0, [100.0, -50.0]);
        let segments = Segmenter::new(SearchProjection::new(Some(&user)), 32)
            .segment(&Geometry::circle([1.0, 1.0], 2.0));
        assert_eq!(segments.len(), 32);
        for segment in &segments {
            for v in segment.vertices() {
                let r = (v[0] - 1.0).hypot(v[1] - 1.0);
                assert!((r - 2.0).abs() < 1e-9, "vertex {v:?} off the user-space circle");
            }
        }
    }

    #[test]
    fn test_non_finite_circle_is_skipped() {
        assert!(segment(&Geometry::circle([0.0, 0.0], f64::NAN)).is_empty());
    }
}
