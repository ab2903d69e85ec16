//! Shared camera offset.
//!
//! World coordinates minus this offset are screen coordinates. Render passes
//! read it; camera-follow logic may write it.

use bevy_ecs::prelude::Resource;
use glam::Vec2;

/// Top-left corner of the view in world pixels.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraOffset(pub Vec2);
