//! Map view collaborators: pixel/coordinate conversion and the optional user
//! projection.
//!
//! Feature geometries and the spatial index live in the host's coordinate
//! space (the *user* space). Distances are measured in the view projection.
//! When no user projection is active both spaces coincide.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, Pixel};

/// Pixel ↔ coordinate conversion for the current view, in user space.
pub trait MapView: Send + Sync {
    fn coordinate_from_pixel(&self, pixel: Pixel) -> Coordinate;
    fn pixel_from_coordinate(&self, coordinate: Coordinate) -> Pixel;
}

/// Reprojection between the user space and the view projection.
pub trait UserProjection: Send + Sync {
    fn to_view(&self, coordinate: Coordinate) -> Coordinate;
    fn to_user(&self, coordinate: Coordinate) -> Coordinate;
}

/// The projection every distance comparison of one query runs in.
///
/// Resolved once per query (and once per circle segmentation) so the vertex
/// and edge passes never disagree on which space they measure in.
#[derive(Clone, Copy, Default)]
pub struct SearchProjection<'a> {
    user: Option<&'a dyn UserProjection>,
}

impl<'a> SearchProjection<'a> {
    pub fn new(user: Option<&'a dyn UserProjection>) -> Self {
        Self { user }
    }

    /// Search directly in user space.
    pub fn native() -> Self {
        Self { user: None }
    }

    pub fn is_native(&self) -> bool {
        self.user.is_none()
    }

    #[inline]
    pub fn from_user(&self, coordinate: Coordinate) -> Coordinate {
        match self.user {
            Some(user) => user.to_view(coordinate),
            None => coordinate,
        }
    }

    #[inline]
    pub fn to_user(&self, coordinate: Coordinate) -> Coordinate {
        match self.user {
            Some(user) => user.to_user(coordinate),
            None => coordinate,
        }
    }

    /// Moves a circle into the search projection. The radius is measured
    /// along the x axis after reprojection.
    pub fn circle_from_user(&self, center: Coordinate, radius: f64) -> (Coordinate, f64) {
        let Some(user) = self.user else {
            return (center, radius);
        };
        let view_center = user.to_view(center);
        let edge = user.to_view([center[0] + radius, center[1]]);
        let view_radius = (edge[0] - view_center[0]).hypot(edge[1] - view_center[1]);
        (view_center, view_radius)
    }
}

impl fmt::Debug for SearchProjection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchProjection")
            .field("native", &self.is_native())
            .finish()
    }
}

/// Axis-aligned view: `origin` is the coordinate under pixel `[0, 0]` and
/// `resolution` is map units per pixel. Pixel y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedView {
    pub origin: Coordinate,
    pub resolution: f64,
}

impl Default for FixedView {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            resolution: 1.0,
        }
    }
}

impl FixedView {
    pub fn new(origin: Coordinate, resolution: f64) -> Self {
        Self { origin, resolution }
    }
}

impl MapView for FixedView {
    fn coordinate_from_pixel(&self, pixel: Pixel) -> Coordinate {
        [
            self.origin[0] + pixel[0] * self.resolution,
            self.origin[1] - pixel[1] * self.resolution,
        ]
    }

    fn pixel_from_coordinate(&self, coordinate: Coordinate) -> Pixel {
        [
            (coordinate[0] - self.origin[0]) / self.resolution,
            (self.origin[1] - coordinate[1]) / self.resolution,
        ]
    }
}

/// Uniform scale plus offset between user space and view projection:
/// `view = user * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledProjection {
    pub scale: f64,
    pub offset: Coordinate,
}

impl ScaledProjection {
    pub fn new(scale: f64, offset: Coordinate) -> Self {
        Self { scale, offset }
    }
}

impl UserProjection for ScaledProjection {
    fn to_view(&self, c: Coordinate) -> Coordinate {
        [
            c[0] * self.scale + self.offset[0],
            c[1] * self.scale + self.offset[1],
        ]
    }

    fn to_user(&self, c: Coordinate) -> Coordinate {
        [
            (c[0] - self.offset[0]) / self.scale,
            (c[1] - self.offset[1]) / self.scale,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_view_inverts() {
        let view = FixedView::new([100.0, 50.0], 0.5);
        let c = view.coordinate_from_pixel([10.0, 20.0]);
        assert_eq!(c, [105.0, 40.0]);
        assert_eq!(view.pixel_from_coordinate(c), [10.0, 20.0]);
    }

    #[test]
    fn test_native_projection_is_identity() {
        let projection = SearchProjection::native();
        assert!(projection.is_native());
        assert_eq!(projection.from_user([1.5, -2.0]), [1.5, -2.0]);
        assert_eq!(projection.to_user([1.5, -2.0]), [1.5, -2.0]);
        assert_eq!(projection.circle_from_user([1.0, 1.0], 3.0), ([1.0, 1.0], 3.0));
    }

    #[test]
    fn test_user_projection_round_trip() {
        let user = ScaledProjection::new(2.0, [10.0, 0.0]);
        let projection = SearchProjection::new(Some(&user));
        let view = projection.from_user([1.0, 3.0]);
        assert_eq!(view, [12.0, 6.0]);
        assert_eq!(projection.to_user(view), [1.0, 3.0]);

        let (center, radius) = projection.circle_from_user([0.0, 0.0], 5.0);
        assert_eq!(center, [10.0, 0.0]);
        assert!((radius - 10.0).abs() < 1e-12);
    }
}
