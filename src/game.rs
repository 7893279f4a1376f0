use std::f32::consts::PI;

use avian3d::prelude::*;
use bevy::light::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
#[cfg(not(target_arch = "wasm32"))]
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::player::controller::PlayerRoot;

pub struct GamePlugin;

/// First-person view, slaved to the player's orientation and position.
#[derive(Component)]
pub struct PlayerCamera;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(avian3d::prelude::PhysicsPlugins::default());
        app.insert_resource(avian3d::prelude::Gravity(Vec3::NEG_Y * 9.81));
        //app.add_plugins(avian3d::prelude::PhysicsDebugPlugin::default());
        app.add_plugins(EguiPlugin::default());

        #[cfg(not(target_arch = "wasm32"))]
        app.add_plugins(WorldInspectorPlugin::new());

        app.add_plugins(crate::player::PlayerPlugin);
        app.insert_resource(ClearColor(Color::srgb(0.02, 0.03, 0.05)));
        app.add_systems(Startup, setup);
    }
}

/// set up the arena: a flat floor with some static geometry to jump on and
/// strafe around
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ambient_light: ResMut<AmbientLight>,
) {
    ambient_light.brightness = 100.0;

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_x(-PI / 4.),
            ..default()
        },
        // The default cascade config is designed to handle large scenes.
        // As this arena is much smaller, we can tighten the shadow
        // bounds for better visual quality.
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 4.0,
            maximum_distance: 100.0,
            ..default()
        }
        .build(),
    ));

    let floor_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.37, 0.40),
        perceptual_roughness: 1.0,
        ..default()
    });
    let block_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.42, 0.30),
        perceptual_roughness: 0.9,
        ..default()
    });

    // base
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(24.0, 0.1, 24.0))),
        MeshMaterial3d(floor_material),
        RigidBody::Static,
        Collider::cuboid(24.0, 0.1, 24.0),
    ));

    // staircase up to the high platform
    for i in 0..8 {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(1.5, 0.5, 1.0))),
            MeshMaterial3d(block_material.clone()),
            Transform::from_xyz(6.0, 0.25 * (i as f32 + 1.0), 4.0 - i as f32),
            Name::new("Stairs"),
            RigidBody::Static,
            Collider::cuboid(1.5, 0.5, 1.0),
        ));
    }

    // the platform itself, a nice perch to strafe-jump from
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(4.0, 0.4, 4.0))),
        MeshMaterial3d(block_material.clone()),
        Transform::from_xyz(6.0, 2.05, -5.0),
        Name::new("Platform"),
        RigidBody::Static,
        Collider::cuboid(4.0, 0.4, 4.0),
    ));

    // scattered crates at jumpable heights
    for (x, z, size) in [(-4.0, -3.0, 0.8), (-6.5, 2.0, 1.2), (0.0, -7.0, 1.0)] {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(size, size, size))),
            MeshMaterial3d(block_material.clone()),
            Transform::from_xyz(x, size / 2.0 + 0.05, z),
            Name::new("Crate"),
            RigidBody::Static,
            Collider::cuboid(size, size, size),
        ));
    }

    // First-person camera; the player systems keep it glued to the body
    commands.spawn((
        Camera3d::default(),
        PlayerCamera,
        Transform::from_xyz(0.0, 1.35, 0.0),
    ));

    // Spawn at appropriate height: ground is at Y=0.05 (top of 0.1 thick floor)
    // Capsule bottom should be at ground level, so center at 0.05 + 0.8 = 0.85
    commands.spawn((
        PlayerRoot,
        Name::new("Player"),
        Transform::from_xyz(0.0, 0.85, 0.0),
    ));
}
