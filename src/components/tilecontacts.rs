use bevy_ecs::prelude::Component;
use serde::Serialize;

/// Faces of the tile grid an entity touched during one resolution call.
///
/// `pit` and `ground` are evaluated independently: a wide body can stand on a
/// ledge with one foot while its centre hangs over a pit, so callers should
/// check both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Component)]
pub struct CollisionResult {
    pub ground: bool,
    pub ceiling: bool,
    pub left_wall: bool,
    pub right_wall: bool,
    pub pit: bool,
    pub climbable: bool,
}

/// Latest [`CollisionResult`] of an entity, overwritten every tick.
pub type TileContacts = CollisionResult;
