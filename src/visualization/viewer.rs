use bevy::math::primitives::Sphere;
use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::simulation::coordinator::Simulation;
use crate::simulation::states::NVec3;

/// The running simulation, ticked in `FixedUpdate`
#[derive(Resource)]
struct Galaxy(Simulation);

/// Parent of every star; input rotates it as the model transform
#[derive(Component)]
struct GalaxyRoot;

/// Component tagging each sphere with its star index into `Simulation::vertices`
#[derive(Component)]
struct StarIndex(usize);

const WINDOW_SIZE: f32 = 1024.0;
const STAR_RADIUS: f32 = 0.01;

/// Distance of the camera from the origin along +Z
const CAMERA_DISTANCE: f32 = 5.0;

// radians per second
const PITCH_SPEED: f32 = 1.0;
const YAW_SPEED: f32 = 1.0;
const ROLL_SPEED: f32 = 1.0;

/// Open the viewer and tick `simulation` once per `time_step` until the window closes.
pub fn run_viewer(simulation: Simulation) {
    let tick_seconds = f64::from(simulation.parameters().time_step);
    log::info!("run_viewer: starting Bevy viewer with {} stars", simulation.population());

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Gravity Evolution".into(),
                        resolution: WindowResolution::new(WINDOW_SIZE, WINDOW_SIZE),
                        resizable: false,
                        ..Default::default()
                    }),
                    ..Default::default()
                })
                // logging already goes through log4rs
                .disable::<bevy::log::LogPlugin>(),
        )
        .insert_resource(Time::<Fixed>::from_seconds(tick_seconds))
        .insert_resource(Galaxy(simulation))
        .add_systems(Startup, setup_galaxy)
        .add_systems(FixedUpdate, tick_galaxy)
        .add_systems(Update, (rotate_galaxy, sync_stars, exit_on_escape))
        .run();
}

fn to_vec3(x: &NVec3) -> Vec3 {
    Vec3::new(x.x as f32, x.y as f32, x.z as f32)
}

/// Startup system: spawn camera and one sphere per star under the galaxy root
fn setup_galaxy(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    galaxy: Res<Galaxy>,
) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        projection: PerspectiveProjection {
            fov: 45.0_f32.to_radians(),
            near: 1.0,
            far: 100.0,
            ..Default::default()
        }
        .into(),
        transform: Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    });

    // one mesh shared by every star, one material each so speed can recolor it
    let mesh = meshes.add(Sphere::new(STAR_RADIUS).mesh());

    commands
        .spawn((SpatialBundle::default(), GalaxyRoot))
        .with_children(|parent| {
            for (i, x) in galaxy.0.vertices().iter().enumerate() {
                parent.spawn((
                    PbrBundle {
                        mesh: mesh.clone(),
                        material: materials.add(StandardMaterial {
                            base_color: Color::srgb(1.0, 1.0, 1.0),
                            unlit: true,
                            ..Default::default()
                        }),
                        transform: Transform::from_translation(to_vec3(x)),
                        ..Default::default()
                    },
                    StarIndex(i),
                ));
            }
        });
}

/// Fixed-rate system: one simulation tick
fn tick_galaxy(mut galaxy: ResMut<Galaxy>, mut exit: EventWriter<AppExit>) {
    if let Err(err) = galaxy.0.tick() {
        log::error!("simulation stopped after {} ticks: {err}", galaxy.0.ticks());
        exit.send(AppExit::error());
    }
}

/// W/S pitch, A/D yaw, Q/E roll, about the world axes
fn rotate_galaxy(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut root: Query<&mut Transform, With<GalaxyRoot>>,
) {
    let Ok(mut transform) = root.get_single_mut() else {
        return;
    };
    let dt = time.delta_seconds();

    if keys.pressed(KeyCode::KeyW) {
        transform.rotate_x(PITCH_SPEED * dt);
    }
    if keys.pressed(KeyCode::KeyS) {
        transform.rotate_x(-PITCH_SPEED * dt);
    }
    if keys.pressed(KeyCode::KeyA) {
        transform.rotate_y(YAW_SPEED * dt);
    }
    if keys.pressed(KeyCode::KeyD) {
        transform.rotate_y(-YAW_SPEED * dt);
    }
    if keys.pressed(KeyCode::KeyQ) {
        transform.rotate_z(ROLL_SPEED * dt);
    }
    if keys.pressed(KeyCode::KeyE) {
        transform.rotate_z(-ROLL_SPEED * dt);
    }
}

fn exit_on_escape(keys: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}

// ========================================================================================
// Speed coloring
// ========================================================================================

#[derive(Default)]
struct SpeedScale {
    smoothed_max: f32,
}

fn speed_to_color(speed: f32, max_speed: f32) -> Color {
    if max_speed <= 0.0 || !speed.is_finite() {
        return Color::srgb(1.0, 1.0, 1.0);
    }

    // Simple blue -> red gradient
    let t = (speed / max_speed).clamp(0.0, 1.0);
    Color::srgb(t, 0.0, 1.0 - t)
}

/// Copy the committed positions into the star transforms and recolor by speed
fn sync_stars(
    galaxy: Res<Galaxy>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut stars: Query<(&StarIndex, &mut Transform, &Handle<StandardMaterial>)>,
    mut scale: Local<SpeedScale>,
) {
    if !galaxy.is_changed() {
        return;
    }
    let positions = galaxy.0.vertices();
    let velocities = galaxy.0.velocities();

    let max_speed_frame = velocities
        .iter()
        .map(|v| v.norm() as f32)
        .filter(|s| s.is_finite())
        .fold(0.0_f32, f32::max);

    if scale.smoothed_max == 0.0 {
        scale.smoothed_max = max_speed_frame.max(1e-6);
    }

    // Cap outlier influence, then smooth over time (EMA)
    let capped_max = max_speed_frame.min(scale.smoothed_max * 3.0);
    let alpha = 0.01;
    scale.smoothed_max = (1.0 - alpha) * scale.smoothed_max + alpha * capped_max;
    let v_norm = scale.smoothed_max.max(1e-6);

    for (StarIndex(i), mut transform, material) in &mut stars {
        let (Some(x), Some(v)) = (positions.get(*i), velocities.get(*i)) else {
            continue;
        };
        transform.translation = to_vec3(x);
        if let Some(mat) = materials.get_mut(material) {
            mat.base_color = speed_to_color(v.norm() as f32, v_norm);
        }
    }
}
