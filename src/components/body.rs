//! Axis-aligned kinematic body resolved against the tile grid.
//!
//! The tile collision resolver writes straight into these fields: it snaps
//! `x`/`y` to tile boundaries, zeroes the blocked velocity component and
//! updates `is_grounded`.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Position (top-left), velocity in pixels per second and size of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub is_grounded: bool,
}

impl Body {
    /// Create a resting body at `(x, y)` with the given size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width,
            height,
            is_grounded: false,
        }
    }

    /// Builder-style velocity setter.
    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns (x, y, w, h) of the bounding box.
    pub fn aabb(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.width, self.height)
    }
}
