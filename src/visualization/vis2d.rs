//! Bevy 2D viewer for the particle galaxy simulation.
//!
//! Owns no simulation logic: it translates window input into
//! [`SimCommand`]s, steps the simulation once per frame, and mirrors the
//! read-only active-particle view into sprite entities. Massive bodies,
//! trails, and the optional grid are drawn with gizmos.

use std::any::Any;

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow, WindowMode};

use crate::configuration::config::DisplayConfig;
use crate::simulation::frame::{GalaxySim, SimCommand};
use crate::simulation::states::{MassiveBody, NVec2, Rgba};

/// Component tagging each sprite with its slot index into the pool's
/// active view.
#[derive(Component)]
struct ParticleIndex(pub usize);

const GRID_SPACING: f32 = 50.0;

/// Build and run the windowed app around an initialized simulation.
/// Returns the process-level exit status.
pub fn run_app(config: DisplayConfig, sim: GalaxySim) -> AppExit {
    println!(
        "run_app: starting viewer at {}x{} with {} particles",
        config.width,
        config.height,
        sim.active_count()
    );

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config.title.clone(),
                resolution: (config.width as f32, config.height as f32).into(),
                mode: if config.fullscreen {
                    WindowMode::Fullscreen
                } else {
                    WindowMode::Windowed
                },
                present_mode: if config.vsync {
                    PresentMode::AutoVsync
                } else {
                    PresentMode::AutoNoVsync
                },
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(sim)
        .add_systems(Startup, setup_view)
        .add_systems(
            Update,
            (handle_input, frame_step, sync_particles, draw_overlay).chain(),
        )
        .run()
}

/// Extract a displayable message from a caught panic payload. Payloads
/// are `&str` for literal panics and `String` for formatted ones.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Startup: camera plus one pre-spawned sprite per pool slot. Slots past
/// the active count stay hidden; activation only flips visibility.
fn setup_view(mut commands: Commands, sim: Res<GalaxySim>) {
    commands.spawn(Camera2dBundle::default());

    for i in 0..sim.capacity() {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: Color::WHITE,
                    custom_size: Some(Vec2::splat(1.0)),
                    ..Default::default()
                },
                visibility: Visibility::Hidden,
                ..Default::default()
            },
            ParticleIndex(i),
        ));
    }
}

/// Translate keyboard/mouse state into simulation commands.
fn handle_input(
    mut sim: ResMut<GalaxySim>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut exit: EventWriter<AppExit>,
) {
    const PRESET_KEYS: [KeyCode; 5] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
    ];
    for (index, key) in PRESET_KEYS.into_iter().enumerate() {
        if keys.just_pressed(key) {
            sim.apply(SimCommand::SwitchPreset(index));
        }
    }

    if keys.just_pressed(KeyCode::Space) {
        sim.apply(SimCommand::TogglePause);
    }
    if keys.just_pressed(KeyCode::KeyT) {
        sim.apply(SimCommand::ToggleTrails);
    }
    if keys.just_pressed(KeyCode::KeyG) {
        sim.apply(SimCommand::ToggleGrid);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        sim.apply(SimCommand::ResetPreset);
    }
    if keys.just_pressed(KeyCode::Escape) {
        sim.apply(SimCommand::Shutdown);
        exit.send(AppExit::Success);
        return;
    }

    if buttons.just_pressed(MouseButton::Left) {
        if let (Ok(window), Ok((camera, camera_transform))) =
            (windows.get_single(), cameras.get_single())
        {
            if let Some(world) = window
                .cursor_position()
                .and_then(|cursor| camera.viewport_to_world_2d(camera_transform, cursor))
            {
                sim.apply(SimCommand::AddBody(NVec2::new(world.x, world.y)));
            }
        }
    }

    for event in wheel.read() {
        if event.y > 0.0 {
            sim.apply(SimCommand::ScaleTimeDilation { up: true });
        } else if event.y < 0.0 {
            sim.apply(SimCommand::ScaleTimeDilation { up: false });
        }
    }
}

/// Step the simulation by the frame's wall-clock delta.
fn frame_step(mut sim: ResMut<GalaxySim>, time: Res<Time>) {
    sim.advance(time.delta_seconds());
}

/// Mirror the active-particle view into the pre-spawned sprites.
fn sync_particles(
    sim: Res<GalaxySim>,
    mut query: Query<(&ParticleIndex, &mut Transform, &mut Sprite, &mut Visibility)>,
) {
    let particles = sim.particles();
    for (ParticleIndex(i), mut transform, mut sprite, mut visibility) in &mut query {
        match particles.get(*i) {
            Some(p) => {
                transform.translation.x = p.position.x;
                transform.translation.y = p.position.y;
                sprite.color = to_bevy_color(p.color);
                sprite.custom_size = Some(Vec2::splat(p.size));
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

/// Gizmo pass: grid, body trails, and body discs with a glow halo.
fn draw_overlay(
    sim: Res<GalaxySim>,
    mut gizmos: Gizmos,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if sim.show_grid() {
        if let Ok(window) = windows.get_single() {
            draw_grid(&mut gizmos, window.width(), window.height());
        }
    }

    if sim.show_trails() {
        for body in sim.bodies() {
            draw_trail(&mut gizmos, body);
        }
    }

    for body in sim.bodies() {
        let position = Vec2::new(body.position.x, body.position.y);
        gizmos.circle_2d(position, body.radius, to_bevy_color(body.color));

        // Fading halo rings
        for ring in 1..=3u8 {
            let glow = to_bevy_color(body.color.with_alpha(50 / ring));
            gizmos.circle_2d(position, body.radius + ring as f32 * 5.0, glow);
        }
    }
}

fn draw_grid(gizmos: &mut Gizmos, width: f32, height: f32) {
    let color = Color::srgba_u8(50, 50, 50, 100);
    let half_w = width * 0.5;
    let half_h = height * 0.5;

    let mut x = -half_w;
    while x <= half_w {
        gizmos.line_2d(Vec2::new(x, -half_h), Vec2::new(x, half_h), color);
        x += GRID_SPACING;
    }
    let mut y = -half_h;
    while y <= half_h {
        gizmos.line_2d(Vec2::new(-half_w, y), Vec2::new(half_w, y), color);
        y += GRID_SPACING;
    }
}

/// Polyline through the trail ring buffer, alpha ramping toward the
/// newest segment.
fn draw_trail(gizmos: &mut Gizmos, body: &MassiveBody) {
    let len = body.trail.len();
    for (i, (from, to)) in body.trail.iter().zip(body.trail.iter().skip(1)).enumerate() {
        let alpha = (i + 1) as f32 / len as f32;
        let color = to_bevy_color(body.color.with_alpha((100.0 * alpha) as u8));
        gizmos.line_2d(
            Vec2::new(from.x, from.y),
            Vec2::new(to.x, to.y),
            color,
        );
    }
}

fn to_bevy_color(c: Rgba) -> Color {
    Color::srgba_u8(c.r, c.g, c.b, c.a)
}
