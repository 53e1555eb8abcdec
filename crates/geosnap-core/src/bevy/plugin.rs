//! Bevy plugin for pointer snapping.

use bevy::prelude::*;

use crate::bevy::events::{PointerMovedEvent, PointerSnappedEvent};
use crate::bevy::resources::{PointerQueue, SnappedPointer};
use crate::bevy::systems;

/// Registers the snapping messages, resources and systems.
///
/// The host provides `SnapEngineRes` and `SnapViewport`; both systems are
/// no-ops until those resources exist. Gesture tracking reads
/// `ButtonInput<MouseButton>`, so it needs `InputPlugin` (or `DefaultPlugins`).
pub struct GeoSnapPlugin {
    /// Drive the engine's gesture from the left mouse button.
    pub track_mouse_buttons: bool,
    pub pointer_queue: Option<PointerQueue>,
}

impl Default for GeoSnapPlugin {
    fn default() -> Self {
        Self {
            track_mouse_buttons: true,
            pointer_queue: None,
        }
    }
}

impl Plugin for GeoSnapPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.pointer_queue.clone().unwrap_or_default())
            .init_resource::<SnappedPointer>();

        app.add_message::<PointerMovedEvent>()
            .add_message::<PointerSnappedEvent>();

        if self.track_mouse_buttons {
            app.add_systems(
                Update,
                (systems::track_snap_gesture, systems::snap_pointer_moves).chain(),
            );
        } else {
            app.add_systems(Update, systems::snap_pointer_moves);
        }
    }
}
