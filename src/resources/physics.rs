//! Tunables for the platformer physics systems.

use bevy_ecs::prelude::Resource;

use crate::resources::gameconfig::{DEFAULT_GRAVITY, DEFAULT_MAX_FALL_SPEED};

/// Gravity and terminal velocity applied by
/// [`gravity_system`](crate::systems::movement::gravity_system).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    /// Downward acceleration in px/s².
    pub gravity: f32,
    /// Falling speed cap in px/s.
    pub max_fall_speed: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED,
        }
    }
}
