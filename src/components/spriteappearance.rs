//! How an entity's sprite is presented.

use bevy_ecs::prelude::Component;

/// Horizontal facing. Left mirrors the sprite about its pivot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Facing derived from a horizontal velocity; zero keeps `self`.
    pub fn from_velocity(self, vx: f32) -> Facing {
        if vx < 0.0 {
            Facing::Left
        } else if vx > 0.0 {
            Facing::Right
        } else {
            self
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Render-time appearance of a sprite-animated entity.
///
/// `skin` names a sprite configuration to draw this entity with (for example
/// `"dog"` for an NPC). When `None` the session's current configuration is
/// used.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct SpriteAppearance {
    pub facing: Facing,
    pub invulnerable: bool,
    pub alpha: f32,
    pub skin: Option<String>,
}

impl Default for SpriteAppearance {
    fn default() -> Self {
        Self {
            facing: Facing::Right,
            invulnerable: false,
            alpha: 1.0,
            skin: None,
        }
    }
}

impl SpriteAppearance {
    pub fn with_skin(skin: impl Into<String>) -> Self {
        Self {
            skin: Some(skin.into()),
            ..Self::default()
        }
    }
}
