//! Snap configuration.
//!
//! [`SnapConfig`] holds the tunable knobs and round-trips through JSON.
//! [`SnapOptions`] adds the backing collaborator and the optional user
//! projection, and is what [`crate::Snap::new`] consumes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coordinate::DEFAULT_CIRCLE_SIDES;
use crate::error::{Result, SnapError};
use crate::source::{FeatureCollection, SnapTarget, VectorSource};
use crate::view::UserProjection;

/// Default pixel tolerance.
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 10.0;

/// Tunable snapping behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snap to vertices.
    pub vertex: bool,
    /// Snap to edges.
    pub edge: bool,
    /// Maximum pointer-to-candidate distance, in pixels.
    pub pixel_tolerance: f64,
    /// Sides of the polygon that stands in for a circle in the index.
    pub circle_sides: usize,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            vertex: true,
            edge: true,
            pixel_tolerance: DEFAULT_PIXEL_TOLERANCE,
            circle_sides: DEFAULT_CIRCLE_SIDES,
        }
    }
}

impl SnapConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pixel_tolerance.is_finite() || self.pixel_tolerance < 0.0 {
            return Err(SnapError::InvalidTolerance(self.pixel_tolerance));
        }
        if self.circle_sides < 3 {
            return Err(SnapError::InvalidCircleSides(self.circle_sides));
        }
        Ok(())
    }

    /// Squared pixel tolerance used by the acceptance check.
    pub fn tolerance_squared(&self) -> f64 {
        self.pixel_tolerance * self.pixel_tolerance
    }
}

/// Everything needed to build a snap engine.
#[derive(Default, Clone)]
pub struct SnapOptions {
    pub config: SnapConfig,
    pub features: Option<Arc<FeatureCollection>>,
    pub source: Option<Arc<VectorSource>>,
    pub user_projection: Option<Arc<dyn UserProjection>>,
}

impl std::fmt::Debug for SnapOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapOptions")
            .field("config", &self.config)
            .field("features", &self.features.is_some())
            .field("source", &self.source.is_some())
            .field("user_projection", &self.user_projection.is_some())
            .finish()
    }
}

impl SnapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: SnapConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_features(mut self, features: Arc<FeatureCollection>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_source(mut self, source: Arc<VectorSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_user_projection(mut self, projection: Arc<dyn UserProjection>) -> Self {
        self.user_projection = Some(projection);
        self
    }

    pub fn vertex(mut self, enabled: bool) -> Self {
        self.config.vertex = enabled;
        self
    }

    pub fn edge(mut self, enabled: bool) -> Self {
        self.config.edge = enabled;
        self
    }

    pub fn pixel_tolerance(mut self, tolerance: f64) -> Self {
        self.config.pixel_tolerance = tolerance;
        self
    }

    /// Resolve the backing collaborator. Exactly one must be configured.
    pub fn into_target(self) -> Result<SnapTarget> {
        match (self.features, self.source) {
            (Some(features), None) => Ok(SnapTarget::Features(features)),
            (None, Some(source)) => Ok(SnapTarget::Source(source)),
            (Some(_), Some(_)) => Err(SnapError::ConflictingTargets),
            (None, None) => Err(SnapError::MissingTarget),
        }
    }
}
