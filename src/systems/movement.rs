//! Body motion systems.
//!
//! - [`gravity_system`] accelerates airborne bodies downward, capped at the
//!   configured fall speed.
//! - [`integrate_system`] moves every body by its velocity for the tick.
//!
//! Tile resolution runs between the two (see
//! [`tile_collision_system`](crate::systems::collision::tile_collision_system)),
//! so a body that would land this tick is snapped and stopped before it moves.

use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::resources::physics::PhysicsSettings;
use crate::resources::worldtime::WorldTime;

pub fn gravity_system(
    mut query: Query<&mut Body>,
    physics: Res<PhysicsSettings>,
    time: Res<WorldTime>,
) {
    for mut body in query.iter_mut() {
        if body.is_grounded {
            continue;
        }
        body.vy = (body.vy + physics.gravity * time.delta).min(physics.max_fall_speed);
    }
}

pub fn integrate_system(mut query: Query<&mut Body>, time: Res<WorldTime>) {
    for mut body in query.iter_mut() {
        let delta = body.velocity() * time.delta;
        body.x += delta.x;
        body.y += delta.y;
    }
}
