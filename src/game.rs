//! World setup and the per-tick schedule.
//!
//! [`build_world`] inserts every resource and observer the systems need and
//! applies the configured pet; [`build_tick_schedule`] orders the systems the
//! way one tick flows (loads → animation → gravity → tiles → integration);
//! [`tick`] advances the clock and runs it. Rendering happens after a tick
//! through [`render_pass`](crate::systems::render::render_pass).

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::components::animation::{AnimState, AnimationController, AnimationRequest};
use crate::components::body::Body;
use crate::components::spriteappearance::SpriteAppearance;
use crate::components::tilecontacts::TileContacts;
use crate::components::zindex::ZIndex;
use crate::events::petselected::pet_selected_observer;
use crate::events::sheetload::SheetLoadEvent;
use crate::events::switchdebug::switch_debug_observer;
use crate::resources::camera::CameraOffset;
use crate::resources::gameconfig::GameConfig;
use crate::resources::physics::PhysicsSettings;
use crate::resources::spritesheets::LoadHandle;
use crate::resources::spritesystem::SpriteSystem;
use crate::resources::tilecollision::TileCollision;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::{animation_system, select_animation_state};
use crate::systems::collision::tile_collision_system;
use crate::systems::gameconfig::apply_gameconfig_changes;
use crate::systems::movement::{gravity_system, integrate_system};
use crate::systems::sheetloader::{poll_sheet_loads, update_sheet_load_messages};
use crate::systems::time::update_world_time;

pub const PLAYER_SIZE: (f32, f32) = (30.0, 30.0);
pub const DOG_SIZE: (f32, f32) = (24.0, 24.0);

/// Create a world with every resource and observer in place.
///
/// The selected pet from `config` becomes current; an unknown id leaves
/// `pet-a` selected. Sheets are not requested yet, see [`load_sheets`].
pub fn build_world(config: GameConfig) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(PhysicsSettings {
        gravity: config.gravity,
        max_fall_speed: config.max_fall_speed,
    });
    world.insert_resource(TileCollision::new(config.tile_size));
    world.insert_resource(CameraOffset::default());
    world.init_resource::<Messages<SheetLoadEvent>>();

    let mut sprites = SpriteSystem::with_asset_root(config.asset_root.clone());
    if sprites
        .config_mut()
        .try_load_config(&config.selected_pet)
        .is_err()
    {
        warn!(
            "Configured pet {} not found, keeping {}",
            config.selected_pet,
            sprites.config().current_id()
        );
    }
    world.insert_resource(sprites);
    world.insert_resource(config);

    world.spawn(Observer::new(switch_debug_observer));
    world.spawn(Observer::new(pet_selected_observer));

    world
}

/// Request every configured sheet. Completion arrives through
/// [`poll_sheet_loads`] on later ticks.
pub fn load_sheets(world: &mut World) -> Vec<LoadHandle> {
    let overrides: Vec<(String, String)> = world.resource::<GameConfig>().sheet_urls.clone();
    let overrides: Vec<(&str, &str)> = overrides
        .iter()
        .map(|(id, url)| (id.as_str(), url.as_str()))
        .collect();
    let handles = world
        .resource_mut::<SpriteSystem>()
        .load_all_sheets(&overrides);
    info!("Requested {} sprite sheet(s)", handles.len());
    handles
}

/// Systems of one simulation tick, in order.
pub fn build_tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            apply_gameconfig_changes,
            poll_sheet_loads,
            select_animation_state,
            animation_system,
            gravity_system,
            tile_collision_system,
            integrate_system,
            update_sheet_load_messages,
        )
            .chain(),
    );
    schedule
}

/// Advance the clock by `dt` seconds and run one tick.
pub fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
}

/// Spawn the player: drawn with the current configuration, animated from
/// its motion.
pub fn spawn_player(world: &mut World, x: f32, y: f32) -> Entity {
    let (w, h) = PLAYER_SIZE;
    world
        .spawn((
            Body::new(x, y, w, h),
            AnimationController::new(),
            AnimationRequest::new(AnimState::IdleSit),
            SpriteAppearance::default(),
            TileContacts::default(),
            ZIndex(1),
        ))
        .id()
}

/// Spawn the dog NPC, always drawn with the `dog` configuration.
///
/// It has no [`AnimationRequest`], so motion never moves it off `idle`,
/// which its sheet maps.
pub fn spawn_dog(world: &mut World, x: f32, y: f32) -> Entity {
    let (w, h) = DOG_SIZE;
    world
        .spawn((
            Body::new(x, y, w, h),
            AnimationController::with_state(AnimState::Idle),
            SpriteAppearance::with_skin("dog"),
            TileContacts::default(),
            ZIndex(0),
        ))
        .id()
}
