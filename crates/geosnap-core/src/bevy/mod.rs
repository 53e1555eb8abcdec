//! Bevy integration for the snap engine.
//!
//! Hosts insert a [`SnapEngineRes`] and a [`SnapViewport`]; the plugin then
//! snaps every pointer move it receives, through [`PointerMovedEvent`]
//! messages or the [`PointerQueue`], and tracks the left mouse button as the
//! editing gesture.

pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use events::*;
pub use plugin::GeoSnapPlugin;
pub use resources::*;
pub use systems::{snap_pointer_moves, track_snap_gesture};
