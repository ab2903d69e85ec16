//! Z-index component for render ordering.

use bevy_ecs::prelude::Component;

/// Rendering order hint for sprite-animated entities.
///
/// Higher values are drawn later (on top). Entities without one draw at 0;
/// ties keep query order.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);
