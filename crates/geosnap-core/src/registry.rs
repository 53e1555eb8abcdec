//! Feature registry: keeps the spatial index, the extent ledger and the
//! per-feature change subscriptions consistent with each other.

use std::collections::HashMap;
use std::sync::Arc;

use crate::coordinate::Coordinate;
use crate::extent::Extent;
use crate::feature::{FeatureId, FeatureRef};
use crate::geometry::Geometry;
use crate::index::SpatialIndex;
use crate::observable::{Listener, ListenerKey};
use crate::segment::{Segment, Segmenter};
use crate::view::{SearchProjection, UserProjection};

/// Exact circle carried alongside the polygon-approximation segments of a
/// circle feature, in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleData {
    pub center: Coordinate,
    pub radius: f64,
}

/// Payload of one index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentData {
    pub feature: FeatureId,
    pub segment: Segment,
    /// Present only when the feature's top-level geometry is a circle.
    pub circle: Option<CircleData>,
}

/// Tracks every indexed feature.
///
/// Invariants:
/// - a feature has a ledger extent iff it is indexed, and that extent covers
///   all of its entries;
/// - a feature has at most one change subscription.
pub struct FeatureRegistry {
    index: SpatialIndex<SegmentData>,
    extents: HashMap<FeatureId, Extent>,
    subscriptions: HashMap<FeatureId, (FeatureRef, ListenerKey)>,
    on_change: Listener<FeatureId>,
    user_projection: Option<Arc<dyn UserProjection>>,
    circle_sides: usize,
    update_count: u64,
}

impl std::fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("index", &self.index)
            .field("features", &self.extents.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl FeatureRegistry {
    /// `on_change` is attached to every feature registered with `listen`.
    pub fn new(
        on_change: Listener<FeatureId>,
        user_projection: Option<Arc<dyn UserProjection>>,
        circle_sides: usize,
    ) -> Self {
        Self {
            index: SpatialIndex::new(),
            extents: HashMap::new(),
            subscriptions: HashMap::new(),
            on_change,
            user_projection,
            circle_sides,
            update_count: 0,
        }
    }

    pub fn index(&self) -> &SpatialIndex<SegmentData> {
        &self.index
    }

    /// Index `feature`'s current geometry and, if `listen`, subscribe to its
    /// changes.
    ///
    /// Re-adding an indexed feature replaces its entries.
    pub fn add_feature(&mut self, feature: &FeatureRef, listen: bool) {
        let id = feature.id();
        if self.extents.contains_key(&id) {
            self.remove_feature(id, false);
        }

        let segmenter = Segmenter::new(
            SearchProjection::new(self.user_projection.as_deref()),
            self.circle_sides,
        );
        let (extent, mut entries) = feature.read_geometry(|geometry| match geometry {
            Some(geometry) => segment_feature(id, geometry, &segmenter),
            None => (Extent::empty(), Vec::new()),
        });

        let count = entries.len();
        if count == 1 {
            if let Some((extent, data)) = entries.pop() {
                self.index.insert(extent, data);
            }
        } else if count > 1 {
            self.index.bulk_load(entries);
        }
        self.extents.insert(id, extent);
        tracing::debug!("[registry] Indexed {} with {} segments", id, count);

        if listen && !self.subscriptions.contains_key(&id) {
            let key = feature.on_change_shared(Arc::clone(&self.on_change));
            self.subscriptions.insert(id, (Arc::clone(feature), key));
        }
    }

    /// Drop every entry of the feature with `id`; unknown ids are a no-op.
    /// With `unlisten`, the change subscription is released too.
    ///
    /// Returns the number of removed index entries.
    pub fn remove_feature(&mut self, id: FeatureId, unlisten: bool) -> usize {
        let mut removed = 0;
        if let Some(extent) = self.extents.remove(&id) {
            removed = self
                .index
                .remove_where(&extent, |data| data.feature == id)
                .len();
            tracing::debug!("[registry] Removed {} ({} segments)", id, removed);
        }
        if unlisten {
            if let Some((feature, key)) = self.subscriptions.remove(&id) {
                feature.un(key);
            }
        }
        removed
    }

    /// Re-index a feature, keeping its change subscription.
    pub fn update_feature(&mut self, feature: &FeatureRef) {
        self.remove_feature(feature.id(), false);
        self.add_feature(feature, false);
        self.update_count += 1;
    }

    /// The subscribed feature with `id`, if any.
    pub fn subscribed(&self, id: FeatureId) -> Option<&FeatureRef> {
        self.subscriptions.get(&id).map(|(feature, _)| feature)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.extents.contains_key(&id)
    }

    pub fn feature_count(&self) -> usize {
        self.extents.len()
    }

    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of re-indexes performed through [`Self::update_feature`].
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Ledger extent of an indexed feature.
    pub fn extent_of(&self, id: FeatureId) -> Option<Extent> {
        self.extents.get(&id).copied()
    }

    /// Index entries belonging to `id`, found through its ledger extent.
    pub fn entries_for(&self, id: FeatureId) -> Vec<SegmentData> {
        let Some(extent) = self.extents.get(&id) else {
            return Vec::new();
        };
        self.index
            .query_extent(extent)
            .into_iter()
            .filter(|entry| entry.payload.feature == id)
            .map(|entry| entry.payload.clone())
            .collect()
    }

    /// Release every subscription and forget every feature.
    pub fn clear(&mut self) {
        for (_, (feature, key)) in self.subscriptions.drain() {
            feature.un(key);
        }
        self.extents.clear();
        self.index.clear();
    }
}

/// Segments of one feature plus the ledger extent covering all of them.
fn segment_feature(
    id: FeatureId,
    geometry: &Geometry,
    segmenter: &Segmenter<'_>,
) -> (Extent, Vec<(Extent, SegmentData)>) {
    let circle = match geometry {
        Geometry::Circle { center, radius } => Some(CircleData {
            center: *center,
            radius: *radius,
        }),
        _ => None,
    };

    let mut ledger = geometry.extent();
    let mut entries = Vec::new();
    for segment in segmenter.segment(geometry) {
        if !segment.is_finite() {
            tracing::warn!("[registry] Skipping non-finite segment of {}: {:?}", id, segment);
            continue;
        }
        let extent = segment.extent();
        ledger.extend(&extent);
        entries.push((
            extent,
            SegmentData {
                feature: id,
                segment,
                circle,
            },
        ));
    }
    (ledger, entries)
}
