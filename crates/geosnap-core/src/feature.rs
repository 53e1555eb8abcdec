//! Features: stable-identity handles around a mutable geometry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::observable::{Listener, ListenerKey, Observable};

static NEXT_FEATURE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a feature, stable for the feature's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(u64);

impl FeatureId {
    fn next() -> Self {
        Self(NEXT_FEATURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feature#{}", self.0)
    }
}

/// Shared handle to a feature.
pub type FeatureRef = Arc<Feature>;

/// An editable map feature.
///
/// Owned by the host; the snap engine only holds references. Geometry
/// changes notify every change listener with the feature's id.
#[derive(Debug)]
pub struct Feature {
    id: FeatureId,
    geometry: RwLock<Option<Geometry>>,
    change: Observable<FeatureId>,
}

impl Feature {
    /// Creates a new feature with a fresh id.
    pub fn new(geometry: Option<Geometry>) -> FeatureRef {
        Arc::new(Self {
            id: FeatureId::next(),
            geometry: RwLock::new(geometry),
            change: Observable::new(),
        })
    }

    pub fn with_geometry(geometry: Geometry) -> FeatureRef {
        Self::new(Some(geometry))
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Snapshot of the current geometry.
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry.read().clone()
    }

    /// Runs `f` against the current geometry without cloning it.
    pub fn read_geometry<R>(&self, f: impl FnOnce(Option<&Geometry>) -> R) -> R {
        f(self.geometry.read().as_ref())
    }

    /// Replaces the geometry and notifies change listeners.
    pub fn set_geometry(&self, geometry: Option<Geometry>) {
        *self.geometry.write() = geometry;
        self.changed();
    }

    /// Notifies change listeners without touching the geometry, for hosts
    /// that mutate geometry through their own channels.
    pub fn changed(&self) {
        self.change.emit(&self.id);
    }

    pub fn on_change(&self, listener: impl Fn(&FeatureId) + Send + Sync + 'static) -> ListenerKey {
        self.change.subscribe(listener)
    }

    pub fn on_change_shared(&self, listener: Listener<FeatureId>) -> ListenerKey {
        self.change.subscribe_shared(listener)
    }

    pub fn un(&self, key: ListenerKey) -> bool {
        self.change.unsubscribe(key)
    }

    pub fn listener_count(&self) -> usize {
        self.change.listener_count()
    }
}
