//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, clamping long frames and applying `time_scale`.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Longest frame the simulation will step in one go, in seconds.
///
/// A stalled frame (window drag, breakpoint) would otherwise move bodies far
/// enough in one step to tunnel through tiles.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is the unscaled frame delta in seconds. It is clamped to
/// [`MAX_FRAME_DELTA`] before `time_scale` is applied.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt.clamp(0.0, MAX_FRAME_DELTA) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
}
