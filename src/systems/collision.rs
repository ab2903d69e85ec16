use bevy_ecs::prelude::*;

use crate::components::body::Body;
use crate::components::tilecontacts::TileContacts;
use crate::resources::tilecollision::TileCollision;
use crate::resources::worldtime::WorldTime;

/// Resolve every [`Body`] against the level grid for this tick.
///
/// Runs after gravity and before integration: the resolver probes where the
/// body would be after `delta` seconds and snaps it flush to whatever it
/// would hit. Entities carrying [`TileContacts`] get the per-tick result.
pub fn tile_collision_system(
    mut query: Query<(&mut Body, Option<&mut TileContacts>)>,
    tiles: Res<TileCollision>,
    time: Res<WorldTime>,
) {
    for (mut body, contacts) in query.iter_mut() {
        let result = tiles.check_collisions(&mut body, time.delta);
        if let Some(mut contacts) = contacts {
            *contacts = result;
        }
    }
}
