//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution.
//!
//! Overview
//! - `camera` – view offset subtracted from world coordinates when drawing
//! - `debugmode` – presence toggles optional debug overlays and logs
//! - `gameconfig` – INI-backed settings and the persisted pet selection
//! - `physics` – gravity and fall speed
//! - `spriteconfig` – sprite configurations mapping states to sheet cells
//! - `spritesheets` – sheet images and their background loads
//! - `spritesystem` – facade over configuration, sheets and renderer
//! - `tilecollision` – level grid, tile queries and body resolution
//! - `worldtime` – simulation time and delta
pub mod camera;
pub mod debugmode;
pub mod gameconfig;
pub mod physics;
pub mod spriteconfig;
pub mod spritesheets;
pub mod spritesystem;
pub mod tilecollision;
pub mod worldtime;
