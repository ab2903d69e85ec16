//! petplatformer command-line entry point.
//!
//! A 2D platformer core built on:
//! - **bevy_ecs** for the entity-component-system tick
//! - **image** + a background loader thread for sprite sheets
//! - **raylib** (optional `raylib` feature) for a playable window
//!
//! # Commands
//!
//! - `validate <json>` – check a sprite configuration file
//! - `export [--pet ID]` – print a configuration as JSON
//! - `stats` – load the configured sheets and print pipeline stats
//! - `select <pet>` – switch pet and persist the choice
//! - `simulate --level <json> --ticks N` – run headless ticks and report
//! - `window --level <json>` – play the level (needs `--features raylib`)
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config ./config.ini simulate --level level.json --ticks 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info};
use serde_json::json;

use petplatformer::components::animation::AnimationController;
use petplatformer::components::body::Body;
use petplatformer::components::tilecontacts::TileContacts;
use petplatformer::events::petselected::PetSelectedEvent;
use petplatformer::game;
use petplatformer::render::recorder::{DrawCall, RecordingContext};
use petplatformer::resources::gameconfig::GameConfig;
use petplatformer::resources::spriteconfig::{SpriteConfigStore, SpriteConfiguration};
use petplatformer::resources::spritesystem::SpriteSystem;
use petplatformer::resources::tilecollision::{TileCollision, TileGrid};
use petplatformer::systems::render::render_pass;

/// How long headless commands wait for sheet loads.
const LOAD_TIMEOUT: Duration = Duration::from_secs(5);
const TICK_DT: f32 = 1.0 / 60.0;

/// Pet platformer sprite pipeline and tile physics
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a sprite configuration JSON file.
    Validate { json: PathBuf },
    /// Print a configuration (the selected one by default) as JSON.
    Export {
        #[arg(long)]
        pet: Option<String>,
    },
    /// Load the configured sheets and print pipeline stats as JSON.
    Stats,
    /// Make a pet current and save it as the preferred one.
    Select { pet: String },
    /// Run the tick loop headless over a level and report the result.
    Simulate {
        #[arg(long, value_name = "JSON")]
        level: PathBuf,
        #[arg(long, default_value_t = 60)]
        ticks: u32,
        #[arg(long, default_value_t = 16.0)]
        spawn_x: f32,
        #[arg(long, default_value_t = 0.0)]
        spawn_y: f32,
    },
    /// Play a level in a window.
    #[cfg(feature = "raylib")]
    Window {
        #[arg(long, value_name = "JSON")]
        level: PathBuf,
    },
}

fn load_config(path: &Path) -> GameConfig {
    let mut config = GameConfig::with_path(path);
    if let Err(e) = config.load_from_file() {
        info!("{}; using defaults", e);
    }
    config
}

fn load_level(path: &Path) -> Result<TileGrid, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level {}: {}", path.display(), e))?;
    TileGrid::from_json(&text).map_err(|e| format!("Invalid level {}: {}", path.display(), e))
}

fn validate(path: &Path) -> Result<(), String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let config: SpriteConfiguration =
        serde_json::from_str(&text).map_err(|e| format!("Malformed configuration: {}", e))?;
    let report = SpriteConfigStore::new().validate_config(&config);
    if report.valid {
        println!("{} is valid ({} cells)", path.display(), config.cells.len());
        Ok(())
    } else {
        Err(report
            .error
            .unwrap_or_else(|| "invalid configuration".to_string()))
    }
}

fn export(config: &GameConfig, pet: Option<&str>) -> Result<(), String> {
    let mut store = SpriteConfigStore::new();
    store.load_config(&config.selected_pet);
    let json = store.export_config(pet).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn stats(config: GameConfig) -> Result<(), String> {
    let mut sprites = SpriteSystem::with_asset_root(config.asset_root.clone());
    sprites.switch_pet(&config.selected_pet);
    sprites.load_all_sheets(&config.sheet_overrides());
    sprites.finish_loads(LOAD_TIMEOUT);
    let out = serde_json::to_string_pretty(&sprites.stats()).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

fn select(config: GameConfig, pet: &str) -> Result<(), String> {
    SpriteConfigStore::new()
        .try_load_config(pet)
        .map_err(|e| e.to_string())?;
    let mut world = game::build_world(config);
    world.trigger(PetSelectedEvent::new(pet));
    let current = world.resource::<SpriteSystem>().config().current_id().to_string();
    println!("Selected {}", current);
    Ok(())
}

fn simulate(
    config: GameConfig,
    level: &Path,
    ticks: u32,
    spawn_x: f32,
    spawn_y: f32,
) -> Result<(), String> {
    let grid = load_level(level)?;
    let mut world = game::build_world(config);
    world.resource_mut::<TileCollision>().set_level(grid);
    game::load_sheets(&mut world);
    world.resource_mut::<SpriteSystem>().finish_loads(LOAD_TIMEOUT);

    let player = game::spawn_player(&mut world, spawn_x, spawn_y);
    let mut schedule = game::build_tick_schedule();
    for _ in 0..ticks {
        game::tick(&mut world, &mut schedule, TICK_DT);
    }

    let mut ctx = RecordingContext::new();
    render_pass(&mut world, &mut ctx);

    let body = *world
        .get::<Body>(player)
        .ok_or_else(|| "player despawned".to_string())?;
    let contacts = world.get::<TileContacts>(player).copied().unwrap_or_default();
    let anim = world
        .get::<AnimationController>(player)
        .map(AnimationController::snapshot);

    let report = json!({
        "ticks": ticks,
        "player": {
            "x": body.x,
            "y": body.y,
            "vx": body.vx,
            "vy": body.vy,
            "grounded": body.is_grounded,
            "animation": anim,
        },
        "contacts": contacts,
        "draw": {
            "images": ctx.images().count(),
            "fills": ctx.count(|c| matches!(c, DrawCall::FillRect { .. })),
        },
    });
    let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

#[cfg(feature = "raylib")]
fn window(config: GameConfig, level: &Path) -> Result<(), String> {
    use petplatformer::events::switchdebug::SwitchDebugEvent;
    use petplatformer::render::raylib_canvas::{RaylibCanvas, SheetTextures};
    use petplatformer::resources::camera::CameraOffset;
    use petplatformer::systems::render::render_debug_ui;
    use raylib::prelude::*;

    const RUN_SPEED: f32 = 150.0;
    const JUMP_SPEED: f32 = -350.0;

    let grid = load_level(level)?;
    let (window_width, window_height) = config.window_size();
    let target_fps = config.target_fps;

    let (mut rl, thread) = raylib::init()
        .size(window_width as i32, window_height as i32)
        .resizable()
        .title("petplatformer")
        .build();
    rl.set_target_fps(target_fps);
    rl.set_exit_key(None);

    let mut world = game::build_world(config);
    world.resource_mut::<TileCollision>().set_level(grid);
    game::load_sheets(&mut world);
    let player = game::spawn_player(&mut world, 16.0, 0.0);
    game::spawn_dog(&mut world, 64.0, 0.0);
    let mut schedule = game::build_tick_schedule();
    let mut textures = SheetTextures::new();

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();

        if rl.is_key_pressed(KeyboardKey::KEY_F11) {
            world.trigger(SwitchDebugEvent {});
        }
        if rl.is_key_pressed(KeyboardKey::KEY_ONE) {
            world.trigger(PetSelectedEvent::new("A"));
        }
        if rl.is_key_pressed(KeyboardKey::KEY_TWO) {
            world.trigger(PetSelectedEvent::new("B"));
        }

        if let Some(mut body) = world.get_mut::<Body>(player) {
            let left = rl.is_key_down(KeyboardKey::KEY_LEFT);
            let right = rl.is_key_down(KeyboardKey::KEY_RIGHT);
            body.vx = match (left, right) {
                (true, false) => -RUN_SPEED,
                (false, true) => RUN_SPEED,
                _ => body.vx * 0.8_f32.powf(dt * 1000.0 / 16.0),
            };
            if rl.is_key_pressed(KeyboardKey::KEY_SPACE) && body.is_grounded {
                body.vy = JUMP_SPEED;
                body.is_grounded = false;
            }
        }

        game::tick(&mut world, &mut schedule, dt);

        if let Some(body) = world.get::<Body>(player).copied() {
            let focus = glam::Vec2::new(
                body.x - window_width as f32 / 2.0,
                body.y - window_height as f32 / 2.0,
            );
            world.resource_mut::<CameraOffset>().0 = focus.max(glam::Vec2::ZERO);
        }

        textures.sync(&mut rl, &thread, world.resource::<SpriteSystem>().sheets());

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::SKYBLUE);
        let mut canvas = RaylibCanvas::new(&mut d, &textures);
        render_pass(&mut world, &mut canvas);
        render_debug_ui(&mut world, &mut canvas);
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli.config);

    let result = match cli.command {
        Command::Validate { json } => validate(&json),
        Command::Export { pet } => export(&config, pet.as_deref()),
        Command::Stats => stats(config),
        Command::Select { pet } => select(config, &pet),
        Command::Simulate {
            level,
            ticks,
            spawn_x,
            spawn_y,
        } => simulate(config, &level, ticks, spawn_x, spawn_y),
        #[cfg(feature = "raylib")]
        Command::Window { level } => window(config, &level),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
