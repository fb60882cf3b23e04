mod body;
mod components;
mod error;
mod info;
mod projection;
mod resources;
mod starfield;
mod systems;

use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

use crate::body::SolarSystem;
use crate::resources::{COMET_INTERVAL_SECS, TICK_HZ, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::resources::{SimClock, SimConfig, SimRng, SimSettings, Viewport};
use crate::starfield::{CometShower, StarField};
use crate::systems::*;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Physix".into(),
            resolution: WindowResolution::new(VIEWPORT_WIDTH as u32, VIEWPORT_HEIGHT as u32),
            resizable: false,
            ..default()
        }),
        ..default()
    }));

    let system = match SolarSystem::solar() {
        Ok(system) => system,
        Err(err) => {
            error!("invalid body catalogue: {err}");
            return;
        }
    };

    app.add_plugins(EguiPlugin::default())
        .insert_resource(ClearColor(Color::BLACK))
        .init_resource::<SimConfig>()
        .init_resource::<Viewport>()
        .init_resource::<SimSettings>()
        .init_resource::<SimClock>()
        .init_resource::<SimRng>()
        .insert_resource(system)
        .init_resource::<StarField>()
        .insert_resource(CometShower::new(COMET_INTERVAL_SECS))
        .add_systems(EguiPrimaryContextPass, ui_overlay)
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                keyboard_controls,
                mouse_selection,
                launch_comets,
                update_portrait,
                sync_body_transforms,
                sync_star_transforms,
                draw_selection_gizmos,
                draw_comets,
            )
                .chain(),
        )
        .add_systems(
            FixedUpdate,
            (advance_simulation, flicker_stars, move_comets).chain(),
        )
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .run();
}
