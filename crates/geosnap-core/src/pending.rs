//! Deferred re-indexing while a pointer gesture is in progress.
//!
//! Change notifications that arrive mid-gesture are collected here, keyed by
//! feature id, and re-indexed once when the gesture ends.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::feature::{FeatureId, FeatureRef};

#[derive(Debug, Default)]
pub struct PendingUpdates {
    gesture_active: bool,
    features: BTreeMap<FeatureId, FeatureRef>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    pub fn begin_gesture(&mut self) {
        self.gesture_active = true;
    }

    /// Queue `feature` for re-indexing. Returns false if it was already
    /// queued during this gesture.
    pub fn defer(&mut self, feature: &FeatureRef) -> bool {
        self.features
            .insert(feature.id(), Arc::clone(feature))
            .is_none()
    }

    /// Drop a queued feature, e.g. because it left the backing collection.
    pub fn forget(&mut self, id: FeatureId) -> bool {
        self.features.remove(&id).is_some()
    }

    /// End the gesture and hand back every queued feature in id order,
    /// leaving the queue empty.
    pub fn end_gesture(&mut self) -> Vec<FeatureRef> {
        self.gesture_active = false;
        std::mem::take(&mut self.features).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.gesture_active = false;
        self.features.clear();
    }
}
