use std::f32::consts::FRAC_PI_2;

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};

use crate::game::PlayerCamera;
use crate::player::physics::{Grounded, PlayerBody};

/// The controlled player entity. Carries the look state and the planar
/// velocity the grounded branch integrates; the physics capsule is a separate
/// entity resolved through [`ControlledBody`].
#[derive(Component, Default)]
#[require(Transform)]
pub struct PlayerRoot;

/// Handle to the physics capsule, resolved once when the player spawns.
#[derive(Component)]
pub struct ControlledBody(pub Entity);

/// Accumulated mouse-look state. Yaw is unbounded; pitch is clamped so the
/// view can point straight up or down but never past it.
#[derive(Component, Debug, Default)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookAngles {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-FRAC_PI_2, FRAC_PI_2),
        }
    }

    pub fn apply_delta(&mut self, delta: Vec2, sensitivity: f32) {
        self.yaw -= delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Combined view orientation, yaw applied outermost so pitching never
    /// introduces roll.
    pub fn orientation(&self) -> Quat {
        (Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)).normalize()
    }
}

/// Horizontal velocity in the player's local frame (x = strafe, y = along ±Z).
/// Persists across ticks and is never reset on direction change; while
/// airborne it deliberately diverges from the body's live velocity.
#[derive(Component, Debug, Default, Deref, DerefMut)]
pub struct PlanarVelocity(pub Vec2);

impl PlanarVelocity {
    /// Proportional pull toward zero. With no input this stops the player
    /// asymptotically instead of freezing it.
    fn decelerate(&mut self, rate: f32, dt: f32) {
        self.0 += self.0 * rate * dt;
    }

    /// Push toward the input direction, then cap the magnitude. The clamp
    /// only ever shortens the vector, it never rescales up.
    fn accelerate(&mut self, direction: Vec2, acceleration: f32, max_speed: f32, dt: f32) {
        self.0 += direction * acceleration * dt;
        self.0 = self.0.clamp_length_max(max_speed);
    }
}

#[derive(Component, Debug, Clone)]
pub struct MovementTuning {
    /// Top ground speed, and the lateral speed cap for air control.
    pub max_speed: f32,
    /// Seconds to reach `max_speed` from standstill under full input; only
    /// used to derive the ground acceleration.
    pub time_zero_to_max: f32,
    /// Absolute cap on speed gained per second while airborne. Deliberately
    /// independent of (and much smaller than) the ground acceleration.
    pub air_acceleration: f32,
    /// Negative decay rate applied to the planar velocity each grounded tick.
    pub deceleration: f32,
    pub mouse_sensitivity: f32,
    pub jump_velocity: f32,
    /// Camera height above the body origin.
    pub camera_height: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            time_zero_to_max: 0.08,
            air_acceleration: 1.5,
            deceleration: -7.0,
            mouse_sensitivity: 0.002,
            jump_velocity: 3.0,
            camera_height: 0.5,
        }
    }
}

impl MovementTuning {
    pub fn acceleration(&self) -> f32 {
        self.max_speed / self.time_zero_to_max
    }
}

/// Accumulates mouse motion into the look angles and writes the resulting
/// orientation to the player and the camera. Deltas only steer the view while
/// the cursor is captured; left click captures it, Escape releases it.
pub fn handle_mouse_look(
    mut cursor_options: Single<&mut CursorOptions>,
    mut cursor_events: MessageReader<bevy::input::mouse::MouseMotion>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut roots: Query<(&mut LookAngles, &mut Transform, &MovementTuning), With<PlayerRoot>>,
    mut cameras: Query<&mut Transform, (With<PlayerCamera>, Without<PlayerRoot>)>,
) {
    let mut delta = Vec2::ZERO;
    for event in cursor_events.read() {
        delta += event.delta;
    }

    if mouse.just_pressed(MouseButton::Left) && cursor_options.grab_mode != CursorGrabMode::Locked {
        cursor_options.grab_mode = CursorGrabMode::Locked;
        cursor_options.visible = false;
        debug!("cursor captured");
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        cursor_options.grab_mode = CursorGrabMode::None;
        cursor_options.visible = true;
        debug!("cursor released");
    }

    if cursor_options.grab_mode != CursorGrabMode::Locked {
        return;
    }

    let Ok((mut angles, mut player_transform, tuning)) = roots.single_mut() else {
        return;
    };

    angles.apply_delta(delta, tuning.mouse_sensitivity);

    // The camera is a slaved view: it and the player always share the exact
    // same orientation
    let orientation = angles.orientation();
    player_transform.rotation = orientation;
    if let Ok(mut camera_transform) = cameras.single_mut() {
        camera_transform.rotation = orientation;
    }
}

/// The per-tick movement step: reads the keys, gates the jump on the grounded
/// flag, integrates the planar velocity (grounded) or nudges the live body
/// velocity (airborne), and keeps the capsule free of physics torque.
pub fn apply_movement(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut roots: Query<
        (&ControlledBody, &LookAngles, &mut PlanarVelocity, &MovementTuning),
        With<PlayerRoot>,
    >,
    mut bodies: Query<(&mut LinearVelocity, &mut AngularVelocity, &mut Grounded), With<PlayerBody>>,
) {
    let dt = time.delta_secs();

    for (body, angles, mut planar, tuning) in roots.iter_mut() {
        let Ok((mut velocity, mut angular, mut grounded)) = bodies.get_mut(body.0) else {
            continue;
        };

        let direction = input_direction(&keyboard);
        // The branch decision uses the flag as it was before the jump fired
        let standing = grounded.0;

        if keyboard.pressed(KeyCode::Space) && grounded.0 {
            velocity.0.y = tuning.jump_velocity;
            grounded.0 = false;
        }

        if standing {
            // Bleed off the old velocity before pushing toward the input, so
            // reversing direction has to fight the existing momentum
            planar.decelerate(tuning.deceleration, dt);
            planar.accelerate(direction, tuning.acceleration(), tuning.max_speed, dt);

            // Only yaw carries planar movement into world space; pitching the
            // view must not tilt it
            let world = Quat::from_rotation_y(angles.yaw) * Vec3::new(planar.x, 0.0, planar.y);
            velocity.0.x = world.x;
            velocity.0.z = world.z;
        } else if direction != Vec2::ZERO {
            // Air strafing: nudge the live body velocity by whatever speed
            // budget is left under the lateral cap. With no input the body
            // keeps its momentum untouched.
            let lateral_speed = velocity.0.xz().length();
            let budget = (tuning.max_speed - lateral_speed).min(tuning.air_acceleration);
            velocity.0.x += direction.x * budget * dt;
            velocity.0.z += direction.y * budget * dt;
        }

        // The capsule never rotates under physics torque
        angular.0 = Vec3::ZERO;
    }
}

/// Keeps the camera on the body's shoulders and the player entity on the
/// camera point. A body the physics world hasn't placed yet skips the frame.
pub fn sync_camera(
    mut roots: Query<(&ControlledBody, &mut Transform, &MovementTuning), With<PlayerRoot>>,
    bodies: Query<&Transform, (With<PlayerBody>, Without<PlayerRoot>)>,
    mut cameras: Query<
        &mut Transform,
        (With<PlayerCamera>, Without<PlayerRoot>, Without<PlayerBody>),
    >,
) {
    for (body, mut root_transform, tuning) in roots.iter_mut() {
        let Ok(body_transform) = bodies.get(body.0) else {
            continue;
        };

        let eye = body_transform.translation + Vec3::Y * tuning.camera_height;
        if let Ok(mut camera_transform) = cameras.single_mut() {
            camera_transform.translation = eye;
        }
        root_transform.translation = eye;
    }
}

fn key_value(keyboard: &ButtonInput<KeyCode>, key: KeyCode) -> f32 {
    if keyboard.pressed(key) { 1.0 } else { 0.0 }
}

fn key_axis(keyboard: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    key_value(keyboard, positive) - key_value(keyboard, negative)
}

/// Strafe and forward/back key state as a unit direction, or zero when no
/// movement key is held. `y` runs along +Z, so W maps to -1 (forward).
pub(crate) fn input_direction(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    Vec2::new(
        key_axis(keyboard, KeyCode::KeyD, KeyCode::KeyA),
        key_axis(keyboard, KeyCode::KeyS, KeyCode::KeyW),
    )
    .normalize_or_zero()
}
