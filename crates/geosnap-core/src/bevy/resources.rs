//! ECS Resources for pointer snapping.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::coordinate::{Coordinate, Pixel};
use crate::query::SnapResult;
use crate::snap::{MapPointerEvent, Snap};
use crate::view::MapView;

/// The snap engine driven by the plugin's systems.
#[derive(Resource, Debug)]
pub struct SnapEngineRes(pub Snap);

/// The host's current map view.
#[derive(Resource, Clone)]
pub struct SnapViewport(pub Arc<dyn MapView>);

impl SnapViewport {
    pub fn new(view: impl MapView + 'static) -> Self {
        Self(Arc::new(view))
    }
}

/// Last pointer position after snapping.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SnappedPointer {
    pub pixel: Pixel,
    pub coordinate: Coordinate,
    /// Present when the last position was snapped.
    pub result: Option<SnapResult>,
}

impl SnappedPointer {
    pub fn is_snapped(&self) -> bool {
        self.result.is_some()
    }
}

/// Thread-safe pointer event queue.
///
/// Lets hosts outside the ECS push pointer events that are snapped on the
/// next frame.
#[derive(Resource, Clone, Default)]
pub struct PointerQueue {
    inner: Arc<Mutex<VecDeque<MapPointerEvent>>>,
}

impl PointerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event to be snapped.
    pub fn push(&self, event: MapPointerEvent) {
        self.inner.lock().push_back(event);
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<MapPointerEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
