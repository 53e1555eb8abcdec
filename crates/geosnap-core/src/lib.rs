//! Geosnap Core Library
//!
//! Vertex and edge snapping for interactive vector editing.
//!
//! Features of one backing collaborator are decomposed into segments and
//! kept in an R-tree. A pointer query looks up candidates inside a pixel
//! tolerance box, prefers the nearest vertex, and falls back to the nearest
//! point on an edge.
//!
//! - Core engine: [`Snap`] with its [`SnapOptions`]
//! - Bevy mode: [`bevy::GeoSnapPlugin`] feeds pointer moves through the engine

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod coordinate;
pub mod error;
pub mod extent;
pub mod feature;
pub mod geometry;
pub mod index;
pub mod observable;
pub mod pending;
pub mod query;
pub mod registry;
pub mod segment;
pub mod snap;
pub mod source;
pub mod view;

// Bevy integration
pub mod bevy;

pub use config::{SnapConfig, SnapOptions};
pub use coordinate::{Coordinate, Pixel};
pub use error::{Result, SnapError};
pub use extent::Extent;
pub use feature::{Feature, FeatureId, FeatureRef};
pub use geometry::{Geometry, GeometryKind};
pub use observable::{ListenerKey, Observable};
pub use query::SnapResult;
pub use segment::{Segment, Segmenter};
pub use snap::{MapPointerEvent, PointerEventKind, Snap, SnapEvent};
pub use source::{FeatureCollection, FeatureProvider, SnapTarget, VectorSource};
pub use view::{FixedView, MapView, ScaledProjection, SearchProjection, UserProjection};
