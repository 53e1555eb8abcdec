//! Snapping systems.

use bevy::prelude::*;

use crate::bevy::events::{PointerMovedEvent, PointerSnappedEvent};
use crate::bevy::resources::{PointerQueue, SnapEngineRes, SnapViewport, SnappedPointer};
use crate::snap::{MapPointerEvent, PointerEventKind};

/// Mirror the left mouse button into the engine's gesture state.
///
/// Releasing the button flushes every feature change deferred while it was
/// held. Gestures started by queued `Down` events are left to their `Up`.
pub fn track_snap_gesture(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    engine: Option<Res<SnapEngineRes>>,
    mut started_by_button: Local<bool>,
) {
    let (Some(buttons), Some(engine)) = (buttons, engine) else {
        return;
    };
    let pressed = buttons.pressed(MouseButton::Left);
    let active = engine.0.is_gesture_active();
    if !active {
        // Ended elsewhere, e.g. by a queued `Up`.
        *started_by_button = false;
    }
    if pressed && !active {
        engine.0.begin_gesture();
        *started_by_button = true;
        tracing::debug!("[snap] Gesture started");
    } else if !pressed && active && *started_by_button {
        let flushed = engine.0.end_gesture();
        *started_by_button = false;
        tracing::debug!("[snap] Gesture ended, {} features re-indexed", flushed);
    }
}

/// Snap queued pointer events and pointer move messages.
///
/// Moves read from messages count as drags while the left button is held.
pub fn snap_pointer_moves(
    engine: Option<Res<SnapEngineRes>>,
    viewport: Option<Res<SnapViewport>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    queue: Res<PointerQueue>,
    mut moves: MessageReader<PointerMovedEvent>,
    mut pointer: ResMut<SnappedPointer>,
    mut snapped: MessageWriter<PointerSnappedEvent>,
) {
    let (Some(engine), Some(viewport)) = (engine, viewport) else {
        moves.clear();
        return;
    };
    let dragging = buttons.is_some_and(|b| b.pressed(MouseButton::Left));
    let move_kind = if dragging {
        PointerEventKind::Drag
    } else {
        PointerEventKind::Move
    };

    let mut events = queue.drain();
    events.extend(
        moves
            .read()
            .map(|m| MapPointerEvent::new(move_kind, m.pixel, m.coordinate)),
    );

    for mut event in events {
        let result = engine.0.snap_event(&mut event, viewport.0.as_ref());
        engine.0.handle_gesture(event.kind);
        *pointer = SnappedPointer {
            pixel: event.pixel,
            coordinate: event.coordinate,
            result,
        };
        if let Some(result) = result {
            snapped.write(PointerSnappedEvent {
                kind: event.kind,
                result,
            });
        }
    }
}
