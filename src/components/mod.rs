//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the game world.
//!
//! Submodules overview:
//! - [`animation`] – animation states, timing controller and per-tick state requests
//! - [`body`] – kinematic box resolved against the tile grid
//! - [`spriteappearance`] – facing, flash, alpha and per-entity sprite skin
//! - [`tilecontacts`] – tile faces touched during the latest tick
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod animation;
pub mod body;
pub mod spriteappearance;
pub mod tilecontacts;
pub mod zindex;
