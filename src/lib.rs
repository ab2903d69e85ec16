//! Pet platformer core library.
//!
//! This module exposes the sprite pipeline, tile collision, and the ECS
//! components, resources, systems, and events that drive them, for use by the
//! binary and by integration tests.

pub mod components;
pub mod events;
pub mod game;
pub mod render;
pub mod resources;
pub mod systems;
