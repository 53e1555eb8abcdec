//! ECS Messages for pointer snapping.

use bevy::prelude::*;

use crate::coordinate::{Coordinate, Pixel};
use crate::query::SnapResult;
use crate::snap::PointerEventKind;

/// Message carrying a raw pointer position to snap.
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerMovedEvent {
    pub pixel: Pixel,
    /// Pointer position in user space.
    pub coordinate: Coordinate,
}

/// Message fired when a pointer event snapped onto a feature.
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerSnappedEvent {
    pub kind: PointerEventKind,
    pub result: SnapResult,
}
