//! Event and observer to toggle debug visualization and diagnostics.
//!
//! Emitting a [`SwitchDebugEvent`] flips the presence of the [`DebugMode`]
//! resource and the sprite renderer's debug flag together, so pivot markers,
//! debug boxes and labels appear and disappear as one.
use crate::resources::debugmode::DebugMode;
use crate::resources::gameconfig::GameConfig;
use crate::resources::spritesystem::SpriteSystem;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

/// Event used to toggle the [`DebugMode`] resource on/off.
#[derive(Event, Debug, Clone, Copy)]
pub struct SwitchDebugEvent {}

/// Observer that toggles the [`DebugMode`] resource.
///
/// - If `DebugMode` is present, it is removed (debug disabled).
/// - If absent, it is inserted (debug enabled).
///
/// The in-memory [`GameConfig`] follows along so a later config change does
/// not undo the toggle. Nothing is written to disk.
pub fn switch_debug_observer(
    _trigger: On<SwitchDebugEvent>,
    mut commands: Commands,
    debug_mode: Option<Res<DebugMode>>,
    sprites: Option<ResMut<SpriteSystem>>,
    config: Option<ResMut<GameConfig>>,
) {
    let enable = debug_mode.is_none();
    if enable {
        commands.insert_resource(DebugMode {});
    } else {
        commands.remove_resource::<DebugMode>();
    }

    if let Some(mut sprites) = sprites {
        if enable {
            sprites.enable_debug();
        } else {
            sprites.disable_debug();
        }
    }
    if let Some(mut config) = config {
        config.debug = enable;
    }
    info!("Debug mode {}", if enable { "enabled" } else { "disabled" });
}
