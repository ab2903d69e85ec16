use bevy_ecs::prelude::Resource;

/// Simulation clock, advanced once per tick by
/// [`update_world_time`](crate::systems::time::update_world_time).
///
/// `elapsed` and `delta` are in seconds and already include `time_scale`.
#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
        }
    }
}

impl WorldTime {
    pub fn delta_ms(&self) -> f32 {
        self.delta * 1000.0
    }

    /// Accumulated game clock in milliseconds, used for render effects.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed as f64 * 1000.0
    }
}
