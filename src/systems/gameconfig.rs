//! Game configuration change detection system.
//!
//! Monitors [`GameConfig`] for changes and pushes its settings into the
//! physics, collision and sprite resources. On first insertion that applies
//! the values loaded from the INI file.

use bevy_ecs::prelude::*;
use log::info;

use crate::resources::debugmode::DebugMode;
use crate::resources::gameconfig::GameConfig;
use crate::resources::physics::PhysicsSettings;
use crate::resources::spritesystem::SpriteSystem;
use crate::resources::tilecollision::TileCollision;

/// System that applies game configuration changes.
///
/// This system detects when [`GameConfig`] is added or modified and:
/// 1. copies gravity and fall speed into [`PhysicsSettings`]
/// 2. sets the tile size of [`TileCollision`]
/// 3. points the sheet manager at the configured asset root
/// 4. inserts or removes [`DebugMode`] to match `[debug] enabled`
///
/// The selected pet is applied once at startup by the world setup, not here,
/// so persisting a new selection does not re-run a pet switch.
pub fn apply_gameconfig_changes(
    maybe_config: Option<Res<GameConfig>>,
    mut physics: ResMut<PhysicsSettings>,
    mut tiles: ResMut<TileCollision>,
    mut sprites: ResMut<SpriteSystem>,
    debug_mode: Option<Res<DebugMode>>,
    mut commands: Commands,
) {
    let Some(config) = maybe_config else {
        return;
    };
    if !(config.is_changed() || config.is_added()) {
        return;
    }

    let wanted = PhysicsSettings {
        gravity: config.gravity,
        max_fall_speed: config.max_fall_speed,
    };
    if *physics != wanted {
        *physics = wanted;
    }
    if tiles.tile_size != config.tile_size {
        tiles.tile_size = config.tile_size;
    }
    if sprites.sheets().asset_root() != config.asset_root.as_path() {
        sprites.sheets_mut().set_asset_root(config.asset_root.clone());
    }

    match (config.debug, debug_mode.is_some()) {
        (true, false) => {
            commands.insert_resource(DebugMode {});
            sprites.enable_debug();
        }
        (false, true) => {
            commands.remove_resource::<DebugMode>();
            sprites.disable_debug();
        }
        _ => {}
    }

    info!(
        "Applied config: gravity={}, max_fall={}, tile={}, debug={}",
        config.gravity, config.max_fall_speed, config.tile_size, config.debug
    );
}
