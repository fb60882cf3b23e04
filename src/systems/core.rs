use bevy::asset::LoadState;
use bevy::audio::{AudioSink, AudioSinkPlayback, Volume};
use bevy::math::DVec2;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::input::EguiWantsInput;

use crate::body::{Body, SolarSystem};
use crate::components::*;
use crate::resources::*;
use crate::starfield::{CometShower, StarField};

/// Number keys that select a body by registry index.
const BODY_KEYS: [KeyCode; 9] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
];

/// Sets up the camera, body circles, starfield, portrait slot and music.
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    asset_server: Res<AssetServer>,
    mut rng: ResMut<SimRng>,
    mut stars: ResMut<StarField>,
    system: Res<SolarSystem>,
    viewport: Res<Viewport>,
) {
    commands.spawn(Camera2d);

    for (index, body) in system.bodies().iter().enumerate() {
        commands.spawn((
            Mesh2d(meshes.add(Circle::new(body.display_radius))),
            MeshMaterial2d(materials.add(ColorMaterial::from(body.render_color()))),
            Transform::from_translation(viewport.world_position(body.position).extend(1.0)),
            BodyIndex(index),
        ));
    }

    *stars = StarField::scatter(
        &mut rng.0,
        NUM_STARS,
        viewport.width as f32,
        viewport.height as f32,
    );
    let star_mesh = meshes.add(Circle::new(1.0));
    let star_material = materials.add(ColorMaterial::from(Color::WHITE));
    for (index, star) in stars.stars.iter().enumerate() {
        let world = viewport.screen_to_world(star.position.as_dvec2());
        commands.spawn((
            Mesh2d(star_mesh.clone()),
            MeshMaterial2d(star_material.clone()),
            Transform::from_translation(world.extend(0.0)).with_scale(star_scale(star.radius)),
            StarIndex(index),
        ));
    }

    let portrait_center = DVec2::new(
        f64::from(PORTRAIT_SIZE) / 2.0,
        viewport.height - 20.0 - f64::from(PORTRAIT_SIZE) / 2.0,
    );
    commands.spawn((
        Sprite::default(),
        Transform::from_translation(viewport.screen_to_world(portrait_center).extend(2.0)),
        Visibility::Hidden,
        Portrait::default(),
    ));

    commands.spawn((
        AudioPlayer::new(asset_server.load(MUSIC_PATH)),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(MUSIC_VOLUME)),
        Music,
    ));

    info!(
        "spawned {} bodies and {} stars",
        system.len(),
        stars.stars.len()
    );
}

fn star_scale(radius: u32) -> Vec3 {
    Vec3::new(radius as f32, radius as f32, 1.0)
}

/// Advances every body and then the simulated clock by one timestep unless paused.
///
/// A degenerate step is logged, pauses the simulation and leaves the clock where it was.
pub fn advance_simulation(
    mut system: ResMut<SolarSystem>,
    mut clock: ResMut<SimClock>,
    mut settings: ResMut<SimSettings>,
    config: Res<SimConfig>,
) {
    if settings.paused {
        return;
    }

    match system.step(&config) {
        Ok(()) => clock.advance(config.timestep),
        Err(err) => {
            error!("integration halted after {:.0} days: {err}", clock.days());
            settings.paused = true;
        }
    }
}

pub fn flicker_stars(
    mut stars: ResMut<StarField>,
    mut rng: ResMut<SimRng>,
    settings: Res<SimSettings>,
) {
    if settings.paused {
        return;
    }
    stars.flicker(&mut rng.0);
}

pub fn move_comets(mut shower: ResMut<CometShower>, settings: Res<SimSettings>) {
    if settings.paused {
        return;
    }
    for comet in shower.comets.iter_mut() {
        comet.advance();
    }
}

/// Replaces the comet shower on a real-time interval.
pub fn launch_comets(
    mut shower: ResMut<CometShower>,
    mut rng: ResMut<SimRng>,
    viewport: Res<Viewport>,
    time: Res<Time>,
) {
    shower.timer.tick(time.delta());
    if shower.timer.just_finished() {
        shower.launch(&mut rng.0, viewport.width as f32, viewport.height as f32);
    }
}

/// Copies registry positions into the circles' transforms.
pub fn sync_body_transforms(
    mut query: Query<(&BodyIndex, &mut Transform)>,
    system: Res<SolarSystem>,
    viewport: Res<Viewport>,
) {
    for (index, mut transform) in query.iter_mut() {
        if let Some(body) = system.get(**index) {
            transform.translation = viewport.world_position(body.position).extend(1.0);
        }
    }
}

pub fn sync_star_transforms(
    mut query: Query<(&StarIndex, &mut Transform)>,
    stars: Res<StarField>,
) {
    for (index, mut transform) in query.iter_mut() {
        if let Some(star) = stars.stars.get(**index) {
            transform.scale = star_scale(star.radius);
        }
    }
}

/// Handles the pause, mute, info, quit and body-selection keys.
pub fn keyboard_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<SimSettings>,
    system: Res<SolarSystem>,
    mut exit: MessageWriter<AppExit>,
    mut sinks: Query<&mut AudioSink, With<Music>>,
) {
    if keyboard.just_pressed(KeyCode::KeyP) {
        settings.paused = !settings.paused;
        info!(
            "simulation {}",
            if settings.paused { "paused" } else { "resumed" }
        );
    }

    for (index, key) in BODY_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) && index < system.len() {
            select(&mut settings, &system, Some(index));
        }
    }

    if keyboard.just_pressed(KeyCode::KeyI) {
        select(&mut settings, &system, None);
    }

    if keyboard.just_pressed(KeyCode::KeyQ) {
        exit.write(AppExit::Success);
    }

    if keyboard.just_pressed(KeyCode::KeyM) {
        settings.muted = !settings.muted;
        let volume = if settings.muted { 0.0 } else { UNMUTED_VOLUME };
        for mut sink in sinks.iter_mut() {
            sink.set_volume(Volume::Linear(volume));
        }
        info!("music {}", if settings.muted { "muted" } else { "unmuted" });
    }
}

/// A click clears the selection; hovering over a body selects it while running.
pub fn mouse_selection(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    egui_input: Res<EguiWantsInput>,
    mut settings: ResMut<SimSettings>,
    system: Res<SolarSystem>,
    viewport: Res<Viewport>,
) {
    if egui_input.wants_any_pointer_input() {
        return;
    }

    if buttons.get_just_pressed().next().is_some() {
        select(&mut settings, &system, None);
    }

    if settings.paused {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    if let Some(index) = body_under_cursor(&system, &viewport, cursor.as_dvec2()) {
        select(&mut settings, &system, Some(index));
    }
}

/// Last body in registry order whose circle contains `cursor` (screen pixels).
pub fn body_under_cursor(system: &SolarSystem, viewport: &Viewport, cursor: DVec2) -> Option<usize> {
    let target = viewport.to_meters(cursor);
    system
        .bodies()
        .iter()
        .enumerate()
        .filter(|(_, body)| {
            body.position.distance(target) * viewport.scale <= f64::from(body.display_radius)
        })
        .map(|(index, _)| index)
        .last()
}

fn select(settings: &mut SimSettings, system: &SolarSystem, selected: Option<usize>) {
    if settings.selected == selected {
        return;
    }
    settings.selected = selected;
    match selected.and_then(|index| system.get(index)) {
        Some(body) => info!("selected {}", body.name),
        None => info!("selection cleared"),
    }
}

/// Highlights the selected body, traces its orbit radius and points at it when off screen.
pub fn draw_selection_gizmos(
    mut gizmos: Gizmos,
    system: Res<SolarSystem>,
    settings: Res<SimSettings>,
    viewport: Res<Viewport>,
) {
    let Some(body) = settings.selected.and_then(|index| system.get(index)) else {
        return;
    };

    let position = viewport.world_position(body.position);
    gizmos.circle_2d(
        Isometry2d::from_translation(position),
        body.display_radius + SELECTION_RING_PADDING,
        Color::WHITE,
    );

    if body.is_primary {
        return;
    }

    let primary = system.primary();
    let orbit_radius = (body.position - primary.position).length() * viewport.scale;
    gizmos.circle_2d(
        Isometry2d::from_translation(viewport.world_position(primary.position)),
        orbit_radius as f32,
        body.render_color(),
    );

    let screen = viewport.to_screen(body.position);
    if let Some(anchor) = viewport.offscreen_anchor(screen, f64::from(INDICATOR_MARGIN)) {
        gizmos.line_2d(viewport.screen_to_world(anchor), position, Color::WHITE);
    }
}

pub fn draw_comets(mut gizmos: Gizmos, shower: Res<CometShower>, viewport: Res<Viewport>) {
    let color = Color::srgb(0.0, 1.0, 0.0);
    for comet in &shower.comets {
        let position = viewport.screen_to_world(comet.position.as_dvec2());
        gizmos.circle_2d(Isometry2d::from_translation(position), 1.0, color);
    }
}

/// Loads the selected body's portrait and swaps in a flat placeholder if the image is missing.
pub fn update_portrait(
    mut query: Query<(&mut Portrait, &mut Sprite, &mut Visibility)>,
    settings: Res<SimSettings>,
    system: Res<SolarSystem>,
    asset_server: Res<AssetServer>,
) {
    let Ok((mut portrait, mut sprite, mut visibility)) = query.single_mut() else {
        return;
    };
    let selected = settings.selected.and_then(|index| system.get(index).map(|body| (index, body)));

    let Some((index, body)) = selected else {
        if portrait.showing.take().is_some() {
            *visibility = Visibility::Hidden;
            portrait.image = None;
        }
        return;
    };

    if portrait.showing != Some(index) {
        let handle: Handle<Image> = asset_server.load(portrait_path(body.name));
        *sprite = Sprite {
            image: handle.clone(),
            custom_size: Some(Vec2::splat(PORTRAIT_SIZE)),
            ..default()
        };
        *visibility = Visibility::Visible;
        *portrait = Portrait {
            showing: Some(index),
            image: Some(handle),
            fallback: false,
        };
        return;
    }

    if portrait.fallback {
        return;
    }
    let failed = portrait
        .image
        .as_ref()
        .is_some_and(|handle| matches!(asset_server.load_state(handle.id()), LoadState::Failed(_)));
    if failed {
        warn!("portrait not found: {}", portrait_path(body.name));
        *sprite = Sprite::from_color(placeholder_color(body), Vec2::splat(PORTRAIT_SIZE));
        portrait.fallback = true;
    }
}

/// Flat fill shown when a body's portrait image is missing.
pub fn placeholder_color(body: &Body) -> Color {
    if body.is_primary {
        Color::srgb_u8(255, 255, 0)
    } else {
        Color::srgb_u8(128, 128, 128)
    }
}

pub fn portrait_path(name: &str) -> String {
    format!("images/planets/{}.jpg", name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::SystemState;
    use bevy::image::ImagePlugin;
    use rand::{SeedableRng, rngs::StdRng};
    use std::time::Duration;

    fn assert_vec2_close(a: Vec2, b: Vec2, tolerance: f32) {
        let diff = (a - b).length();
        assert!(
            diff <= tolerance,
            "expected {:?} to be within {} of {:?}, diff {}",
            a,
            tolerance,
            b,
            diff
        );
    }

    fn sim_world() -> World {
        let mut world = World::new();
        world.insert_resource(SolarSystem::solar().expect("catalogue is valid"));
        world.insert_resource(SimClock::default());
        world.insert_resource(SimSettings::default());
        world.insert_resource(SimConfig::default());
        world.insert_resource(Viewport::default());
        world
    }

    fn run_advance(world: &mut World) {
        let mut system_state: SystemState<(
            ResMut<SolarSystem>,
            ResMut<SimClock>,
            ResMut<SimSettings>,
            Res<SimConfig>,
        )> = SystemState::new(world);
        {
            let (system, clock, settings, config) = system_state.get_mut(world);
            advance_simulation(system, clock, settings, config);
        }
        system_state.apply(world);
    }

    #[test]
    fn advance_simulation_steps_clock_and_bodies() {
        let mut world = sim_world();
        let start = world.resource::<SolarSystem>().bodies()[3].position;

        run_advance(&mut world);

        assert_eq!(world.resource::<SimClock>().days(), 1.0);
        let earth = &world.resource::<SolarSystem>().bodies()[3];
        assert_ne!(earth.position, start);
    }

    #[test]
    fn paused_simulation_does_not_advance() {
        let mut world = sim_world();
        world.resource_mut::<SimSettings>().paused = true;
        let before = world.resource::<SolarSystem>().clone();

        run_advance(&mut world);

        assert_eq!(world.resource::<SimClock>().elapsed, 0.0);
        assert_eq!(world.resource::<SolarSystem>().bodies(), before.bodies());
    }

    #[test]
    fn degenerate_step_pauses_instead_of_panicking() {
        let mut world = sim_world();
        let solar = SolarSystem::solar().expect("catalogue is valid");
        let mut bodies: Vec<Body> = solar.bodies()[..2].to_vec();
        bodies[1].position = bodies[0].position;
        let system = SolarSystem::new(bodies).expect("valid registry");
        assert_eq!(
            system.clone().step(&SimConfig::default()),
            Err(SimError::DegenerateDistance { body: 0, other: 1 })
        );
        world.insert_resource(system);

        run_advance(&mut world);

        assert!(world.resource::<SimSettings>().paused);
        assert_eq!(world.resource::<SimClock>().elapsed, 0.0);
    }

    #[test]
    fn body_transforms_follow_projection() {
        let mut world = sim_world();
        let sun = world.spawn((BodyIndex(0), Transform::default())).id();
        let earth = world.spawn((BodyIndex(3), Transform::default())).id();

        let mut system_state: SystemState<(
            Query<(&BodyIndex, &mut Transform)>,
            Res<SolarSystem>,
            Res<Viewport>,
        )> = SystemState::new(&mut world);
        {
            let (query, system, viewport) = system_state.get_mut(&mut world);
            sync_body_transforms(query, system, viewport);
        }
        system_state.apply(&mut world);

        let sun_at = world.get::<Transform>(sun).expect("sun transform").translation;
        let earth_at = world.get::<Transform>(earth).expect("earth transform").translation;
        assert_vec2_close(sun_at.truncate(), Vec2::ZERO, 1e-4);
        assert_vec2_close(earth_at.truncate(), vec2(-30.0, 0.0), 1e-4);
    }

    #[test]
    fn keyboard_toggles_pause_selects_and_quits() {
        let mut world = sim_world();
        world.init_resource::<Messages<AppExit>>();
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyP);
        keyboard.press(KeyCode::Digit3);
        keyboard.press(KeyCode::KeyQ);
        world.insert_resource(keyboard);

        let mut system_state: SystemState<(
            Res<ButtonInput<KeyCode>>,
            ResMut<SimSettings>,
            Res<SolarSystem>,
            MessageWriter<AppExit>,
            Query<&mut AudioSink, With<Music>>,
        )> = SystemState::new(&mut world);
        {
            let (keyboard, settings, system, exit, sinks) = system_state.get_mut(&mut world);
            keyboard_controls(keyboard, settings, system, exit, sinks);
        }
        system_state.apply(&mut world);

        let settings = world.resource::<SimSettings>();
        assert!(settings.paused);
        assert_eq!(settings.selected, Some(3));
        assert_eq!(world.resource::<Messages<AppExit>>().len(), 1);
    }

    #[test]
    fn info_key_clears_selection_and_mute_toggles() {
        let mut world = sim_world();
        world.init_resource::<Messages<AppExit>>();
        world.resource_mut::<SimSettings>().selected = Some(5);
        let mut keyboard = ButtonInput::<KeyCode>::default();
        keyboard.press(KeyCode::KeyI);
        keyboard.press(KeyCode::KeyM);
        world.insert_resource(keyboard);

        let mut system_state: SystemState<(
            Res<ButtonInput<KeyCode>>,
            ResMut<SimSettings>,
            Res<SolarSystem>,
            MessageWriter<AppExit>,
            Query<&mut AudioSink, With<Music>>,
        )> = SystemState::new(&mut world);
        {
            let (keyboard, settings, system, exit, sinks) = system_state.get_mut(&mut world);
            keyboard_controls(keyboard, settings, system, exit, sinks);
        }
        system_state.apply(&mut world);

        let settings = world.resource::<SimSettings>();
        assert_eq!(settings.selected, None);
        assert!(settings.muted);
        assert!(!settings.paused);
    }

    #[test]
    fn cursor_hit_test_uses_display_radius() {
        let system = SolarSystem::solar().expect("catalogue is valid");
        let viewport = Viewport::default();

        // Earth sits 30 px left of centre with a 3 px radius.
        assert_eq!(
            body_under_cursor(&system, &viewport, DVec2::new(611.0, 401.0)),
            Some(3)
        );
        assert_eq!(
            body_under_cursor(&system, &viewport, DVec2::new(640.0, 405.0)),
            Some(0)
        );
        assert_eq!(body_under_cursor(&system, &viewport, DVec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn portrait_paths_are_lowercase() {
        assert_eq!(portrait_path("Neptune"), "images/planets/neptune.jpg");
    }

    #[test]
    fn click_clears_selection() {
        let mut world = sim_world();
        world.init_resource::<EguiWantsInput>();
        world.resource_mut::<SimSettings>().selected = Some(2);
        let mut buttons = ButtonInput::<MouseButton>::default();
        buttons.press(MouseButton::Left);
        world.insert_resource(buttons);

        let mut system_state: SystemState<(
            Res<ButtonInput<MouseButton>>,
            Query<&Window, With<PrimaryWindow>>,
            Res<EguiWantsInput>,
            ResMut<SimSettings>,
            Res<SolarSystem>,
            Res<Viewport>,
        )> = SystemState::new(&mut world);
        {
            let (buttons, windows, egui_input, settings, system, viewport) =
                system_state.get_mut(&mut world);
            mouse_selection(buttons, windows, egui_input, settings, system, viewport);
        }
        system_state.apply(&mut world);

        assert_eq!(world.resource::<SimSettings>().selected, None);
    }

    fn run_launch(world: &mut World, elapsed: Duration) {
        let mut time = Time::<()>::default();
        time.advance_by(elapsed);
        world.insert_resource(time);

        let mut system_state: SystemState<(
            ResMut<CometShower>,
            ResMut<SimRng>,
            Res<Viewport>,
            Res<Time>,
        )> = SystemState::new(world);
        {
            let (shower, rng, viewport, time) = system_state.get_mut(world);
            launch_comets(shower, rng, viewport, time);
        }
        system_state.apply(world);
    }

    #[test]
    fn comets_launch_once_the_interval_elapses() {
        let mut world = sim_world();
        world.insert_resource(SimRng(StdRng::seed_from_u64(5)));
        world.insert_resource(CometShower::new(COMET_INTERVAL_SECS));

        run_launch(&mut world, Duration::from_secs(1));
        assert!(world.resource::<CometShower>().comets.is_empty());

        run_launch(&mut world, Duration::from_secs(2));
        assert_eq!(
            world.resource::<CometShower>().comets.len(),
            COMETS_PER_SHOWER
        );
    }

    #[test]
    fn placeholder_is_yellow_for_the_sun_and_gray_otherwise() {
        let system = SolarSystem::solar().expect("catalogue is valid");
        assert_eq!(
            placeholder_color(system.primary()),
            Color::srgb_u8(255, 255, 0)
        );
        assert_eq!(
            placeholder_color(&system.bodies()[3]),
            Color::srgb_u8(128, 128, 128)
        );
    }

    fn wait_for_fallback(app: &mut App, entity: Entity) {
        for _ in 0..2000 {
            app.update();
            let portrait = app.world().get::<Portrait>(entity).expect("portrait present");
            if portrait.fallback {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        panic!("missing portrait never fell back to a placeholder");
    }

    #[test]
    fn missing_portrait_falls_back_and_reloads_on_selection_change() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), ImagePlugin::default()));
        app.insert_resource(SolarSystem::solar().expect("catalogue is valid"));
        app.insert_resource(SimSettings {
            selected: Some(3),
            ..default()
        });
        app.add_systems(Update, update_portrait);
        let entity = app
            .world_mut()
            .spawn((Sprite::default(), Visibility::Hidden, Portrait::default()))
            .id();

        app.update();
        {
            let world = app.world();
            let portrait = world.get::<Portrait>(entity).expect("portrait present");
            assert_eq!(portrait.showing, Some(3));
            assert!(portrait.image.is_some());
            assert!(!portrait.fallback);
            assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Visible));
        }

        wait_for_fallback(&mut app, entity);
        {
            let sprite = app.world().get::<Sprite>(entity).expect("sprite present");
            assert_eq!(sprite.color, Color::srgb_u8(128, 128, 128));
            assert_eq!(sprite.custom_size, Some(Vec2::splat(PORTRAIT_SIZE)));
        }

        app.world_mut().resource_mut::<SimSettings>().selected = Some(0);
        app.update();
        {
            let portrait = app.world().get::<Portrait>(entity).expect("portrait present");
            assert_eq!(portrait.showing, Some(0));
            assert!(!portrait.fallback);
        }

        wait_for_fallback(&mut app, entity);
        let sprite = app.world().get::<Sprite>(entity).expect("sprite present");
        assert_eq!(sprite.color, Color::srgb_u8(255, 255, 0));

        app.world_mut().resource_mut::<SimSettings>().selected = None;
        app.update();
        assert_eq!(
            app.world().get::<Visibility>(entity),
            Some(&Visibility::Hidden)
        );
    }
}
