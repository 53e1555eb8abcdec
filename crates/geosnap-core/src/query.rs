//! Two-pass nearest candidate search over the spatial index.
//!
//! The vertex pass runs first and wins whenever its best candidate is within
//! tolerance; the edge pass only runs when it did not. Candidates are ranked
//! by squared distance in the search projection, and the winner is accepted
//! by squared pixel distance to the pointer.

use serde::{Deserialize, Serialize};

use crate::config::SnapConfig;
use crate::coordinate::{
    Coordinate, Pixel, closest_on_circle, closest_on_segment, squared_distance,
};
use crate::extent::Extent;
use crate::feature::FeatureId;
use crate::index::{IndexEntry, SpatialIndex};
use crate::registry::SegmentData;
use crate::segment::Segment;
use crate::view::{MapView, SearchProjection};

/// A successful snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// Snapped coordinate, in user space.
    pub vertex: Coordinate,
    /// Pixel of the snapped coordinate in the queried view.
    pub vertex_pixel: Pixel,
    pub feature: FeatureId,
    /// Segment the snap landed on. `None` for circle boundary snaps.
    pub segment: Option<Segment>,
}

/// Best candidate found by one pass, in user space.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    vertex: Coordinate,
    feature: FeatureId,
    segment: Option<Segment>,
    distance: f64,
}

impl Candidate {
    fn offer(best: &mut Option<Self>, next: Self) {
        match best {
            Some(current) if current.distance <= next.distance => {}
            _ => *best = Some(next),
        }
    }
}

/// One snap query against an index snapshot.
pub struct SnapQuery<'a> {
    index: &'a SpatialIndex<SegmentData>,
    config: &'a SnapConfig,
    projection: SearchProjection<'a>,
    view: &'a dyn MapView,
}

impl<'a> SnapQuery<'a> {
    pub fn new(
        index: &'a SpatialIndex<SegmentData>,
        config: &'a SnapConfig,
        projection: SearchProjection<'a>,
        view: &'a dyn MapView,
    ) -> Self {
        Self {
            index,
            config,
            projection,
            view,
        }
    }

    /// The user-space extent covered by a square of `2 * tolerance` pixels
    /// centered on `pixel`.
    pub fn search_extent(&self, pixel: Pixel) -> Extent {
        let tolerance = self.config.pixel_tolerance;
        let lower_left = self
            .view
            .coordinate_from_pixel([pixel[0] - tolerance, pixel[1] + tolerance]);
        let upper_right = self
            .view
            .coordinate_from_pixel([pixel[0] + tolerance, pixel[1] - tolerance]);
        Extent::bounding(&[lower_left, upper_right])
    }

    /// Snap the pointer at `pixel` / `coordinate` (user space).
    pub fn run(&self, pixel: Pixel, coordinate: Coordinate) -> Option<SnapResult> {
        let candidates = self.index.query_extent(&self.search_extent(pixel));
        if candidates.is_empty() {
            return None;
        }
        let target = self.projection.from_user(coordinate);

        if self.config.vertex
            && let Some(result) = self
                .vertex_pass(&candidates, target)
                .and_then(|best| self.accept(best, pixel))
        {
            return Some(result);
        }
        if self.config.edge {
            return self
                .edge_pass(&candidates, target)
                .and_then(|best| self.accept(best, pixel));
        }
        None
    }

    fn vertex_pass(
        &self,
        candidates: &[&IndexEntry<SegmentData>],
        target: Coordinate,
    ) -> Option<Candidate> {
        let mut best = None;
        for entry in candidates {
            let data = &entry.payload;
            // Circle polygon vertices are an indexing artifact.
            if data.circle.is_some() {
                continue;
            }
            for &vertex in data.segment.vertices() {
                let distance = squared_distance(self.projection.from_user(vertex), target);
                Candidate::offer(
                    &mut best,
                    Candidate {
                        vertex,
                        feature: data.feature,
                        segment: Some(data.segment),
                        distance,
                    },
                );
            }
        }
        best
    }

    fn edge_pass(
        &self,
        candidates: &[&IndexEntry<SegmentData>],
        target: Coordinate,
    ) -> Option<Candidate> {
        let mut best = None;
        for entry in candidates {
            let data = &entry.payload;
            let (closest, segment) = if let Some(circle) = data.circle {
                let (center, radius) = self
                    .projection
                    .circle_from_user(circle.center, circle.radius);
                (closest_on_circle(target, center, radius), None)
            } else if let Some([start, end]) = data.segment.as_line() {
                let line = [self.projection.from_user(start), self.projection.from_user(end)];
                (closest_on_segment(target, line), Some(data.segment))
            } else {
                continue;
            };
            Candidate::offer(
                &mut best,
                Candidate {
                    vertex: self.projection.to_user(closest),
                    feature: data.feature,
                    segment,
                    distance: squared_distance(closest, target),
                },
            );
        }
        best
    }

    fn accept(&self, best: Candidate, pixel: Pixel) -> Option<SnapResult> {
        let vertex_pixel = self.view.pixel_from_coordinate(best.vertex);
        if squared_distance(vertex_pixel, pixel) <= self.config.tolerance_squared() {
            Some(SnapResult {
                vertex: best.vertex,
                vertex_pixel,
                feature: best.feature,
                segment: best.segment,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use std::sync::Arc;

    use super::*;
    use crate::feature::{Feature, FeatureRef};
    use crate::geometry::Geometry;
    use crate::registry::FeatureRegistry;
    use crate::view::{FixedView, ScaledProjection, UserProjection};

    const EPS: f64 = 1e-9;

    fn indexed(features: &[FeatureRef]) -> FeatureRegistry {
        let mut registry = FeatureRegistry::new(Arc::new(|_: &FeatureId| {}), None, 32);
        for feature in features {
            registry.add_feature(feature, false);
        }
        registry
    }

    fn query(
        registry: &FeatureRegistry,
        config: &SnapConfig,
        coordinate: Coordinate,
    ) -> Option<SnapResult> {
        let view = FixedView::default();
        SnapQuery::new(registry.index(), config, SearchProjection::native(), &view)
            .run(view.pixel_from_coordinate(coordinate), coordinate)
    }

    fn segment() -> FeatureRef {
        Feature::with_geometry(Geometry::line_string(vec![[0.0, 0.0], [10.0, 0.0]]))
    }

    #[test]
    fn test_vertex_wins_over_closer_edge() {
        let registry = indexed(&[segment()]);
        let result = query(&registry, &SnapConfig::default(), [0.4, 0.01]).unwrap();
        assert_eq!(result.vertex, [0.0, 0.0]);
        assert_eq!(result.vertex_pixel, [0.0, 0.0]);
    }

    #[test]
    fn test_edge_only_fallback() {
        let registry = indexed(&[segment()]);
        let config = SnapConfig {
            vertex: false,
            ..SnapConfig::default()
        };
        let result = query(&registry, &config, [5.0, 0.2]).unwrap();
        assert!((result.vertex[0] - 5.0).abs() < EPS);
        assert!(result.vertex[1].abs() < EPS);
        assert_eq!(result.segment, Some(Segment::Line([[0.0, 0.0], [10.0, 0.0]])));
    }

    #[test]
    fn test_edge_pass_runs_when_vertex_out_of_tolerance() {
        let long = Feature::with_geometry(Geometry::line_string(vec![[0.0, 0.0], [30.0, 0.0]]));
        let registry = indexed(&[long]);
        let result = query(&registry, &SnapConfig::default(), [15.0, 0.2]).unwrap();
        assert!((result.vertex[0] - 15.0).abs() < EPS);
        assert!(result.vertex[1].abs() < EPS);
    }

    #[test]
    fn test_out_of_tolerance() {
        let registry = indexed(&[segment()]);
        assert!(query(&registry, &SnapConfig::default(), [5.0, 50.0]).is_none());
    }

    #[test]
    fn test_both_passes_disabled() {
        let registry = indexed(&[segment()]);
        let config = SnapConfig {
            vertex: false,
            edge: false,
            ..SnapConfig::default()
        };
        assert!(query(&registry, &config, [0.0, 0.0]).is_none());
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let point = Feature::with_geometry(Geometry::point([0.0, 0.0]));
        let registry = indexed(&[point]);
        let config = SnapConfig::default();

        let at_limit = query(&registry, &config, [10.0, 0.0]).unwrap();
        assert_eq!(at_limit.vertex, [0.0, 0.0]);
        assert!(query(&registry, &config, [11.0, 0.0]).is_none());
    }

    #[test]
    fn test_points_are_not_edge_candidates() {
        let point = Feature::with_geometry(Geometry::point([0.0, 0.0]));
        let registry = indexed(&[point]);
        let config = SnapConfig {
            vertex: false,
            ..SnapConfig::default()
        };
        assert!(query(&registry, &config, [1.0, 0.0]).is_none());
    }

    #[test]
    fn test_circle_snaps_to_exact_boundary() {
        let circle = Feature::with_geometry(Geometry::circle([0.0, 0.0], 10.0));
        let registry = indexed(&[circle]);
        let config = SnapConfig {
            pixel_tolerance: 1.0,
            ..SnapConfig::default()
        };

        let result = query(&registry, &config, [10.05, 0.0]).unwrap();
        assert!((result.vertex[0] - 10.0).abs() < EPS);
        assert!(result.vertex[1].abs() < EPS);
        assert_eq!(result.segment, None);

        // Halfway between two polygon vertices the approximation sits inside
        // the circle; the snap must still land on the true boundary.
        let angle = PI / 32.0;
        let result = query(&registry, &config, [10.05 * angle.cos(), 10.05 * angle.sin()]).unwrap();
        let radius = result.vertex[0].hypot(result.vertex[1]);
        assert!((radius - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_circle_vertices_are_not_vertex_candidates() {
        let circle = Feature::with_geometry(Geometry::circle([0.0, 0.0], 10.0));
        let registry = indexed(&[circle]);
        let config = SnapConfig {
            edge: false,
            ..SnapConfig::default()
        };
        assert!(query(&registry, &config, [10.0, 0.0]).is_none());
    }

    #[test]
    fn test_nearest_feature_wins() {
        let near = Feature::with_geometry(Geometry::point([2.0, 0.0]));
        let far = Feature::with_geometry(Geometry::point([-4.0, 0.0]));
        let registry = indexed(&[Arc::clone(&far), Arc::clone(&near)]);
        let result = query(&registry, &SnapConfig::default(), [0.0, 0.0]).unwrap();
        assert_eq!(result.feature, near.id());
    }

    #[test]
    fn test_user_projection_measures_in_view_space() {
        // User units are half a view unit; the view is one view unit per pixel.
        let user: Arc<dyn UserProjection> = Arc::new(ScaledProjection::new(0.5, [0.0, 0.0]));
        let mut registry =
            FeatureRegistry::new(Arc::new(|_: &FeatureId| {}), Some(Arc::clone(&user)), 32);
        registry.add_feature(
            &Feature::with_geometry(Geometry::line_string(vec![[0.0, 0.0], [40.0, 0.0]])),
            false,
        );

        // Pixels map to user space at two user units per pixel.
        let view = FixedView::new([0.0, 0.0], 2.0);
        let config = SnapConfig {
            vertex: false,
            ..SnapConfig::default()
        };
        let projection = SearchProjection::new(Some(user.as_ref()));
        let snap = SnapQuery::new(registry.index(), &config, projection, &view);

        let result = snap.run(view.pixel_from_coordinate([20.0, 6.0]), [20.0, 6.0]).unwrap();
        assert!((result.vertex[0] - 20.0).abs() < EPS);
        assert!(result.vertex[1].abs() < EPS);
        assert!((result.vertex_pixel[0] - 10.0).abs() < EPS);

        assert!(snap.run(view.pixel_from_coordinate([20.0, 30.0]), [20.0, 30.0]).is_none());
    }
}
