use avian3d::prelude::*;
use bevy::prelude::*;

use crate::player::controller::{
    ControlledBody, LookAngles, MovementTuning, PlanarVelocity, PlayerRoot,
};

/// The capsule that carries the player through the physics world. It never
/// receives the look rotation; the movement systems drive its velocity and
/// the controlled entity mirrors its position.
#[derive(Component)]
pub struct PlayerBody;

/// Whether the body currently rests on a walkable surface. Owned by the
/// ground sensor; the movement tick only reads it and clears it when a jump
/// is consumed.
#[derive(Component, Default, Deref, DerefMut)]
pub struct Grounded(pub bool);

// Capsule: radius 0.3, height 1.0 -> total height 1.6, center to bottom = 0.8.
// Allow a little slack so small steps and slopes still count as ground.
const GROUNDED_DISTANCE: f32 = 0.85;

/// Bodies rising faster than this are airborne no matter what the probe says,
/// so the tick that consumed a jump cannot instantly re-arm against the
/// launch surface.
const MAX_RISING_SPEED: f32 = 0.1;

/// Spawns the physics capsule for a freshly added player and wires the
/// controller state onto the root, with the look angles taken from the root's
/// starting orientation.
pub fn on_player_spawn(
    on: On<Add, PlayerRoot>,
    mut commands: Commands,
    transforms: Query<&Transform>,
) {
    let root = on.event_target();
    let Ok(start) = transforms.get(root) else {
        return;
    };
    let (yaw, pitch, _) = start.rotation.to_euler(EulerRot::YXZ);

    let body = commands
        .spawn((
            PlayerBody,
            Name::new("PlayerBody"),
            Transform::from_translation(start.translation),
            RigidBody::Dynamic,
            Collider::capsule(0.3, 1.0),
            // All orientation is driven by the look systems, never by torque
            LockedAxes::ROTATION_LOCKED,
            // The movement tick owns horizontal velocity; contact friction
            // would only fight it
            Friction::new(0.0),
            LinearVelocity::default(),
            AngularVelocity::default(),
            Grounded::default(),
            RayCaster::new(Vec3::ZERO, Dir3::NEG_Y),
        ))
        .id();

    commands.entity(root).insert((
        ControlledBody(body),
        LookAngles::new(yaw, pitch),
        PlanarVelocity::default(),
        MovementTuning::default(),
    ));

    info!("player body spawned at {}", start.translation);
}

/// Re-arms the grounded flag from the downward ray probe. Runs before the
/// movement tick so a landing is visible on the same tick.
pub fn update_ground_sensor(
    mut bodies: Query<(&RayHits, &LinearVelocity, &mut Grounded), With<PlayerBody>>,
) {
    for (hits, velocity, mut grounded) in bodies.iter_mut() {
        let probe = hits.iter_sorted().next().map(|hit| hit.distance);
        grounded.0 = grounded_from_probe(probe, velocity.0.y);
    }
}

/// A body is grounded when the probe finds a surface within reach and the
/// body is not on its way up.
fn grounded_from_probe(probe_distance: Option<f32>, vertical_speed: f32) -> bool {
    probe_distance.is_some_and(|distance| {
        distance <= GROUNDED_DISTANCE && vertical_speed <= MAX_RISING_SPEED
    })
}
