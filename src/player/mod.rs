use bevy::prelude::*;

use crate::player::controller::*;
use crate::player::physics::*;

pub mod controller;
pub mod physics;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_player_spawn);
        app.add_systems(Update, (handle_mouse_look, sync_camera).chain());
        app.add_systems(FixedUpdate, (update_ground_sensor, apply_movement).chain());
    }
}
