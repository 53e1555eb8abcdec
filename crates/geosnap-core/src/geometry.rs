//! Geometry variants carried by snappable features.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::extent::Extent;

/// Geometry of a feature, in host (user) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point {
        coordinates: Coordinate,
    },
    LineString {
        coordinates: Vec<Coordinate>,
    },
    LinearRing {
        coordinates: Vec<Coordinate>,
    },
    /// Rings in order: exterior first, then holes.
    Polygon {
        rings: Vec<Vec<Coordinate>>,
    },
    MultiPoint {
        points: Vec<Coordinate>,
    },
    MultiLineString {
        lines: Vec<Vec<Coordinate>>,
    },
    MultiPolygon {
        polygons: Vec<Vec<Vec<Coordinate>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    Circle {
        center: Coordinate,
        radius: f64,
    },
    /// Any geometry type this engine cannot segment. Deserializing an unknown
    /// `type` tag lands here instead of failing the whole document.
    #[serde(other)]
    Unsupported,
}

/// Discriminant of [`Geometry`], used for logging and circle checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Circle,
    Unsupported,
}

impl Geometry {
    pub fn point(coordinates: Coordinate) -> Self {
        Self::Point { coordinates }
    }

    pub fn line_string(coordinates: Vec<Coordinate>) -> Self {
        Self::LineString { coordinates }
    }

    pub fn polygon(rings: Vec<Vec<Coordinate>>) -> Self {
        Self::Polygon { rings }
    }

    pub fn circle(center: Coordinate, radius: f64) -> Self {
        Self::Circle { center, radius }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point { .. } => GeometryKind::Point,
            Self::LineString { .. } => GeometryKind::LineString,
            Self::LinearRing { .. } => GeometryKind::LinearRing,
            Self::Polygon { .. } => GeometryKind::Polygon,
            Self::MultiPoint { .. } => GeometryKind::MultiPoint,
            Self::MultiLineString { .. } => GeometryKind::MultiLineString,
            Self::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            Self::GeometryCollection { .. } => GeometryKind::GeometryCollection,
            Self::Circle { .. } => GeometryKind::Circle,
            Self::Unsupported => GeometryKind::Unsupported,
        }
    }

    /// Bounding extent of the geometry. Circles use center ± radius.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::empty();
        self.extend_extent(&mut extent);
        extent
    }

    fn extend_extent(&self, extent: &mut Extent) {
        match self {
            Self::Point { coordinates } => extent.extend_coordinate(*coordinates),
            Self::LineString { coordinates } | Self::LinearRing { coordinates } => {
                extent.extend(&Extent::bounding(coordinates));
            }
            Self::MultiPoint { points } => extent.extend(&Extent::bounding(points)),
            Self::Polygon { rings } | Self::MultiLineString { lines: rings } => {
                for ring in rings {
                    extent.extend(&Extent::bounding(ring));
                }
            }
            Self::MultiPolygon { polygons } => {
                for ring in polygons.iter().flatten() {
                    extent.extend(&Extent::bounding(ring));
                }
            }
            Self::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.extend_extent(extent);
                }
            }
            Self::Circle { center, radius } => {
                extent.extend_coordinate([center[0] - radius, center[1] - radius]);
                extent.extend_coordinate([center[0] + radius, center[1] + radius]);
            }
            Self::Unsupported => {}
        }
    }
}
