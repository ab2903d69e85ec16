//! Event types and observers.
//!
//! Submodules:
//! - [`petselected`] – choose the player's sprite configuration and persist it
//! - [`sheetload`] – commands and results of the background sheet loader
//! - [`switchdebug`] – toggle debug rendering and diagnostics on/off
pub mod petselected;
pub mod sheetload;
pub mod switchdebug;
