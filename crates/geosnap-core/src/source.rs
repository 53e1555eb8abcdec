//! Backing feature collaborators and the engine's choice between them.
//!
//! - [`FeatureCollection`]: an ordered, explicitly managed feature list.
//! - [`VectorSource`]: an id-keyed feature store.
//!
//! Both report additions and removals; the snap engine indexes whichever one
//! it is configured with.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::feature::{FeatureId, FeatureRef};
use crate::observable::{ListenerKey, Observable};

/// Common surface of the backing collaborators.
pub trait FeatureProvider: Send + Sync {
    /// Every feature currently held.
    fn features(&self) -> Vec<FeatureRef>;
    fn on_add(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey;
    fn on_remove(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey;
    /// Release a listener registered through either hook.
    fn un(&self, key: ListenerKey) -> bool;
    fn listener_count(&self) -> usize;
}

// ============================================================================
// FeatureCollection
// ============================================================================

/// Ordered list of features with add/remove notifications.
#[derive(Debug, Default)]
pub struct FeatureCollection {
    features: RwLock<Vec<FeatureRef>>,
    added: Observable<FeatureRef>,
    removed: Observable<FeatureRef>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_features(features: Vec<FeatureRef>) -> Self {
        Self {
            features: RwLock::new(features),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// Appends a feature and notifies add listeners.
    pub fn push(&self, feature: FeatureRef) {
        self.features.write().push(Arc::clone(&feature));
        self.added.emit(&feature);
    }

    /// Removes the feature with `id`, notifying remove listeners.
    pub fn remove(&self, id: FeatureId) -> Option<FeatureRef> {
        let removed = {
            let mut features = self.features.write();
            let position = features.iter().position(|f| f.id() == id)?;
            features.remove(position)
        };
        self.removed.emit(&removed);
        Some(removed)
    }

    /// Removes every feature, notifying once per feature.
    pub fn clear(&self) {
        let drained: Vec<FeatureRef> = std::mem::take(&mut *self.features.write());
        for feature in &drained {
            self.removed.emit(feature);
        }
    }
}

impl FeatureProvider for FeatureCollection {
    fn features(&self) -> Vec<FeatureRef> {
        self.features.read().clone()
    }

    fn on_add(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey {
        self.added.subscribe(listener)
    }

    fn on_remove(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey {
        self.removed.subscribe(listener)
    }

    fn un(&self, key: ListenerKey) -> bool {
        self.added.unsubscribe(key) || self.removed.unsubscribe(key)
    }

    fn listener_count(&self) -> usize {
        self.added.listener_count() + self.removed.listener_count()
    }
}

// ============================================================================
// VectorSource
// ============================================================================

/// Id-keyed feature store with add-feature/remove-feature notifications.
///
/// Iteration order is ascending feature id.
#[derive(Debug, Default)]
pub struct VectorSource {
    features: RwLock<BTreeMap<FeatureId, FeatureRef>>,
    added: Observable<FeatureRef>,
    removed: Observable<FeatureRef>,
}

impl VectorSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// Adds a feature. Adding a feature that is already present does nothing.
    pub fn add_feature(&self, feature: FeatureRef) -> bool {
        {
            let mut features = self.features.write();
            if features.contains_key(&feature.id()) {
                return false;
            }
            features.insert(feature.id(), Arc::clone(&feature));
        }
        self.added.emit(&feature);
        true
    }

    pub fn add_features(&self, features: impl IntoIterator<Item = FeatureRef>) {
        for feature in features {
            self.add_feature(feature);
        }
    }

    pub fn remove_feature(&self, id: FeatureId) -> Option<FeatureRef> {
        let removed = self.features.write().remove(&id)?;
        self.removed.emit(&removed);
        Some(removed)
    }

    pub fn get_feature_by_id(&self, id: FeatureId) -> Option<FeatureRef> {
        self.features.read().get(&id).cloned()
    }

    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.features.write());
        for feature in drained.values() {
            self.removed.emit(feature);
        }
    }
}

impl FeatureProvider for VectorSource {
    fn features(&self) -> Vec<FeatureRef> {
        self.features.read().values().cloned().collect()
    }

    fn on_add(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey {
        self.added.subscribe(listener)
    }

    fn on_remove(&self, listener: Box<dyn Fn(&FeatureRef) + Send + Sync>) -> ListenerKey {
        self.removed.subscribe(listener)
    }

    fn un(&self, key: ListenerKey) -> bool {
        self.added.unsubscribe(key) || self.removed.unsubscribe(key)
    }

    fn listener_count(&self) -> usize {
        self.added.listener_count() + self.removed.listener_count()
    }
}

// ============================================================================
// SnapTarget
// ============================================================================

/// The one collaborator a snap engine indexes.
#[derive(Debug, Clone)]
pub enum SnapTarget {
    Features(Arc<FeatureCollection>),
    Source(Arc<VectorSource>),
}

impl SnapTarget {
    pub fn provider(&self) -> &dyn FeatureProvider {
        match self {
            Self::Features(collection) => collection.as_ref(),
            Self::Source(source) => source.as_ref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Features(_) => "features",
            Self::Source(_) => "source",
        }
    }
}
