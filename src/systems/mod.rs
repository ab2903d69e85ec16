//! Engine systems.
//!
//! This module groups all ECS systems that advance the simulation and the
//! render pass that draws it.
//!
//! Submodules overview
//! - [`animation`] – pick animation states from motion and advance controllers
//! - [`collision`] – resolve bodies against the tile grid
//! - [`gameconfig`] – push [`GameConfig`](crate::resources::gameconfig::GameConfig) changes into resources
//! - [`movement`] – gravity and position integration
//! - [`render`] – draw level, sprites and debug overlays into a draw context
//! - [`sheetloader`] – background sheet decoding and its per-tick poll
//! - [`time`] – update simulation time and delta

pub mod animation;
pub mod collision;
pub mod gameconfig;
pub mod movement;
pub mod render;
pub mod sheetloader;
pub mod time;
