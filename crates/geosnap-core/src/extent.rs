//! Axis-aligned bounding boxes in data coordinates.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Axis-aligned bounding box.
///
/// The empty extent has inverted infinite bounds so that extending it with
/// any coordinate yields that coordinate's degenerate box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self::empty()
    }
}

impl Extent {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// An extent containing nothing.
    pub const fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    /// Smallest extent containing every coordinate.
    pub fn bounding<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut extent = Self::empty();
        for c in coordinates {
            extent.extend_coordinate(*c);
        }
        extent
    }

    pub fn extend_coordinate(&mut self, c: Coordinate) {
        self.min_x = self.min_x.min(c[0]);
        self.min_y = self.min_y.min(c[1]);
        self.max_x = self.max_x.max(c[0]);
        self.max_y = self.max_y.max(c[1]);
    }

    pub fn extend(&mut self, other: &Extent) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// True when the extent contains no point (inverted or NaN bounds).
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// True when all four bounds are finite and not inverted.
    pub fn is_valid(&self) -> bool {
        !self.is_empty()
            && self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Inclusive intersection test.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains_coordinate(&self, c: Coordinate) -> bool {
        self.min_x <= c[0] && c[0] <= self.max_x && self.min_y <= c[1] && c[1] <= self.max_y
    }

    pub fn min(&self) -> Coordinate {
        [self.min_x, self.min_y]
    }

    pub fn max(&self) -> Coordinate {
        [self.max_x, self.max_y]
    }
}
