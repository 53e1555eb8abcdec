//! The snap engine: lifecycle, event handling and the public query surface.
//!
//! A [`Snap`] indexes the features of exactly one backing collaborator and
//! keeps that index current through add/remove/change notifications.
//! Changes that arrive while a pointer gesture is active are deferred until
//! the gesture ends.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{SnapConfig, SnapOptions};
use crate::coordinate::{Coordinate, Pixel};
use crate::error::Result;
use crate::feature::{FeatureId, FeatureRef};
use crate::observable::{Listener, ListenerKey, Observable};
use crate::pending::PendingUpdates;
use crate::query::{SnapQuery, SnapResult};
use crate::registry::{FeatureRegistry, SegmentData};
use crate::source::SnapTarget;
use crate::view::{MapView, SearchProjection, UserProjection};

/// Kind of a map pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    Down,
    Up,
    Move,
    Drag,
    Click,
    SingleClick,
    DoubleClick,
    Other,
}

impl PointerEventKind {
    pub fn is_snappable(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A pointer event in map terms. Snapping rewrites `pixel` and `coordinate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPointerEvent {
    pub kind: PointerEventKind,
    pub pixel: Pixel,
    /// Pointer position in user space.
    pub coordinate: Coordinate,
}

impl MapPointerEvent {
    pub fn new(kind: PointerEventKind, pixel: Pixel, coordinate: Coordinate) -> Self {
        Self {
            kind,
            pixel,
            coordinate,
        }
    }
}

/// Emitted for every event [`Snap::handle_event`] snapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapEvent {
    pub kind: PointerEventKind,
    pub result: SnapResult,
}

/// Mutable engine state, shared with the notification callbacks.
#[derive(Debug)]
struct SnapState {
    registry: FeatureRegistry,
    pending: PendingUpdates,
}

impl SnapState {
    fn handle_feature_change(&mut self, id: FeatureId) {
        let Some(feature) = self.registry.subscribed(id).cloned() else {
            return;
        };
        if self.pending.is_gesture_active() {
            if self.pending.defer(&feature) {
                tracing::trace!("[pending] Deferred {} until gesture end", id);
            }
        } else {
            self.registry.update_feature(&feature);
        }
    }

    fn handle_feature_remove(&mut self, id: FeatureId) {
        self.pending.forget(id);
        self.registry.remove_feature(id, true);
    }

    /// End the gesture and re-index everything that changed during it.
    fn flush(&mut self) -> usize {
        let features = self.pending.end_gesture();
        let flushed = features.len();
        for feature in &features {
            self.registry.update_feature(feature);
        }
        if flushed > 0 {
            tracing::debug!("[pending] Flushed {} deferred updates", flushed);
        }
        flushed
    }

    fn clear(&mut self) {
        self.registry.clear();
        self.pending.clear();
    }
}

fn with_state(state: &Weak<Mutex<SnapState>>, f: impl FnOnce(&mut SnapState)) {
    if let Some(state) = state.upgrade() {
        f(&mut state.lock());
    }
}

/// Snapping interaction over one feature collaborator.
pub struct Snap {
    config: SnapConfig,
    target: SnapTarget,
    user_projection: Option<Arc<dyn UserProjection>>,
    state: Arc<Mutex<SnapState>>,
    target_keys: Option<(ListenerKey, ListenerKey)>,
    snapped: Observable<SnapEvent>,
}

impl std::fmt::Debug for Snap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snap")
            .field("config", &self.config)
            .field("target", &self.target.kind())
            .field("attached", &self.is_attached())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl Snap {
    /// Build a detached engine. Fails if the configuration is invalid or if
    /// not exactly one collaborator is configured.
    pub fn new(options: SnapOptions) -> Result<Self> {
        options.config.validate()?;
        let config = options.config;
        let user_projection = options.user_projection.clone();
        let target = options.into_target()?;

        let state = Arc::new_cyclic(|weak: &Weak<Mutex<SnapState>>| {
            let weak = weak.clone();
            let on_change: Listener<FeatureId> = Arc::new(move |id: &FeatureId| {
                with_state(&weak, |state| state.handle_feature_change(*id));
            });
            Mutex::new(SnapState {
                registry: FeatureRegistry::new(
                    on_change,
                    user_projection.clone(),
                    config.circle_sides,
                ),
                pending: PendingUpdates::new(),
            })
        });

        Ok(Self {
            config,
            target,
            user_projection,
            state,
            target_keys: None,
            snapped: Observable::new(),
        })
    }

    /// Build and attach in one step.
    pub fn attached(options: SnapOptions) -> Result<Self> {
        let mut snap = Self::new(options)?;
        snap.attach();
        Ok(snap)
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn target(&self) -> &SnapTarget {
        &self.target
    }

    pub fn is_attached(&self) -> bool {
        self.target_keys.is_some()
    }

    /// Index every feature of the collaborator and follow its additions and
    /// removals. No-op while already attached.
    pub fn attach(&mut self) {
        if self.is_attached() {
            return;
        }
        let provider = self.target.provider();
        let features = provider.features();
        {
            let mut state = self.state.lock();
            for feature in &features {
                state.registry.add_feature(feature, true);
            }
        }

        let weak = Arc::downgrade(&self.state);
        let add_key = provider.on_add(Box::new(move |feature: &FeatureRef| {
            with_state(&weak, |state| state.registry.add_feature(feature, true));
        }));
        let weak = Arc::downgrade(&self.state);
        let remove_key = provider.on_remove(Box::new(move |feature: &FeatureRef| {
            with_state(&weak, |state| state.handle_feature_remove(feature.id()));
        }));

        tracing::info!(
            "[snap] Attached to {} with {} features",
            self.target.kind(),
            features.len()
        );
        self.target_keys = Some((add_key, remove_key));
    }

    /// Release every subscription and drop all indexed state.
    pub fn detach(&mut self) {
        if let Some((add_key, remove_key)) = self.target_keys.take() {
            let provider = self.target.provider();
            provider.un(add_key);
            provider.un(remove_key);
            tracing::info!("[snap] Detached from {}", self.target.kind());
        }
        self.state.lock().clear();
    }

    /// Index a feature and follow its changes.
    pub fn add_feature(&self, feature: &FeatureRef) {
        self.add_feature_with(feature, true);
    }

    pub fn add_feature_with(&self, feature: &FeatureRef, listen: bool) {
        self.state.lock().registry.add_feature(feature, listen);
    }

    /// Drop a feature from the index and release its change subscription.
    pub fn remove_feature(&self, id: FeatureId) {
        self.state.lock().handle_feature_remove(id);
    }

    /// Drop a feature's entries, optionally keeping its change subscription.
    pub fn remove_feature_with(&self, id: FeatureId, unlisten: bool) {
        let mut state = self.state.lock();
        if unlisten {
            state.pending.forget(id);
        }
        state.registry.remove_feature(id, unlisten);
    }

    /// Re-index a feature immediately, even mid-gesture.
    pub fn update_feature(&self, feature: &FeatureRef) {
        self.state.lock().registry.update_feature(feature);
    }

    pub fn begin_gesture(&self) {
        self.state.lock().pending.begin_gesture();
    }

    /// End the gesture and re-index deferred features. Returns how many were
    /// re-indexed.
    pub fn end_gesture(&self) -> usize {
        self.state.lock().flush()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.state.lock().pending.is_gesture_active()
    }

    /// Find the snap target for a pointer at `pixel` / `coordinate`.
    pub fn snap_to(
        &self,
        pixel: Pixel,
        coordinate: Coordinate,
        view: &dyn MapView,
    ) -> Option<SnapResult> {
        let state = self.state.lock();
        let projection = SearchProjection::new(self.user_projection.as_deref());
        let result = SnapQuery::new(state.registry.index(), &self.config, projection, view)
            .run(pixel, coordinate);
        tracing::trace!("[snap] Query at {:?} -> {:?}", pixel, result);
        result
    }

    /// Snap a pointer event in place and notify snap listeners.
    ///
    /// Only attached engines snap, and `Other` events are passed through.
    pub fn snap_event(
        &self,
        event: &mut MapPointerEvent,
        view: &dyn MapView,
    ) -> Option<SnapResult> {
        if !self.is_attached() || !event.kind.is_snappable() {
            return None;
        }
        let result = self.snap_to(event.pixel, event.coordinate, view)?;
        event.coordinate = result.vertex;
        event.pixel = result.vertex_pixel;
        self.snapped.emit(&SnapEvent {
            kind: event.kind,
            result,
        });
        Some(result)
    }

    /// Feed a pointer event through the interaction.
    ///
    /// Snaps the event in place, starts the gesture on `Down` and flushes
    /// deferred updates on `Up`. Always returns `true`: snapping never stops
    /// propagation.
    pub fn handle_event(&self, event: &mut MapPointerEvent, view: &dyn MapView) -> bool {
        self.snap_event(event, view);
        self.handle_gesture(event.kind);
        true
    }

    /// `Down` starts the gesture, `Up` ends it. Other kinds are ignored.
    pub fn handle_gesture(&self, kind: PointerEventKind) {
        match kind {
            PointerEventKind::Down => self.begin_gesture(),
            PointerEventKind::Up => {
                self.end_gesture();
            }
            _ => {}
        }
    }

    pub fn on_snap(&self, listener: impl Fn(&SnapEvent) + Send + Sync + 'static) -> ListenerKey {
        self.snapped.subscribe(listener)
    }

    pub fn un_snap(&self, key: ListenerKey) -> bool {
        self.snapped.unsubscribe(key)
    }

    pub fn indexed_feature_count(&self) -> usize {
        self.state.lock().registry.feature_count()
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().registry.entry_count()
    }

    pub fn entries_for(&self, id: FeatureId) -> Vec<SegmentData> {
        self.state.lock().registry.entries_for(id)
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Live per-feature change subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.state.lock().registry.subscription_count()
    }

    /// Total re-indexes caused by updates and flushes.
    pub fn update_count(&self) -> u64 {
        self.state.lock().registry.update_count()
    }
}

impl Drop for Snap {
    fn drop(&mut self) {
        self.detach();
    }
}
