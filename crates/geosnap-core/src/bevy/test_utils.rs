//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `InputPlugin` + `GeoSnapPlugin` with a
//! one-unit-per-pixel view.

use std::sync::Arc;

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::bevy::plugin::GeoSnapPlugin;
use crate::bevy::resources::{PointerQueue, SnapEngineRes, SnapViewport};
use crate::bevy::PointerMovedEvent;
use crate::config::SnapOptions;
use crate::coordinate::Coordinate;
use crate::feature::FeatureRef;
use crate::snap::Snap;
use crate::source::FeatureCollection;
use crate::view::{FixedView, MapView};

/// A headless Bevy app with an attached snap engine.
pub(crate) struct TestApp {
    pub app: App,
    view: FixedView,
}

impl TestApp {
    /// Create a test app snapping to `features`.
    pub fn with_features(features: Vec<FeatureRef>) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let collection = Arc::new(FeatureCollection::from_features(features));
        let snap = Snap::attached(SnapOptions::new().with_features(collection))
            .expect("valid snap options");
        let view = FixedView::default();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(GeoSnapPlugin::default());
        app.insert_resource(SnapEngineRes(snap));
        app.insert_resource(SnapViewport::new(view));
        // Run one update to initialize all resources
        app.update();
        Self { app, view }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    pub fn engine(&self) -> &Snap {
        &self.app.world().resource::<SnapEngineRes>().0
    }

    pub fn pointer_queue(&self) -> PointerQueue {
        self.app.world().resource::<PointerQueue>().clone()
    }

    /// Queue a pointer move to `coordinate` for the next update.
    pub fn move_pointer(&mut self, coordinate: Coordinate) {
        let pixel = self.view.pixel_from_coordinate(coordinate);
        self.app
            .world_mut()
            .resource_mut::<Messages<PointerMovedEvent>>()
            .write(PointerMovedEvent { pixel, coordinate });
    }

    pub fn press_left(&mut self) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
    }

    pub fn release_left(&mut self) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
    }
}
