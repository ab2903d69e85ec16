//! Debug toggle resource.
//!
//! The mere presence of this resource indicates that debug rendering and
//! diagnostics should be enabled: body boxes and state labels in the render
//! pass, pivot markers from the sprite renderer. Remove it to disable debug
//! behavior.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, systems may draw overlays or print extra logs.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DebugMode {}
