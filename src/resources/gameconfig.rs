//! Game configuration resource.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration. The selected pet
//! is the only value the game writes back on its own.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sprites]
//! selected_pet = pet-a
//! asset_root = ./assets
//! sheet_a = bowie_cat_3x3.png
//! sheet_b = happy_buttercup_cat_3x3.png
//! sheet_dog = bonbon_dog_3x3.png
//!
//! [collision]
//! tile_size = 16
//!
//! [physics]
//! gravity = 700
//! max_fall_speed = 500
//!
//! [debug]
//! enabled = false
//!
//! [window]
//! width = 960
//! height = 540
//! target_fps = 60
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::resources::spriteconfig::DEFAULT_CONFIG_ID;
use crate::resources::spritesheets::DEFAULT_SHEETS;

/// Default safe values for startup
const DEFAULT_ASSET_ROOT: &str = "./assets";
const DEFAULT_TILE_SIZE: f32 = 16.0;
pub const DEFAULT_GRAVITY: f32 = 700.0;
pub const DEFAULT_MAX_FALL_SPEED: f32 = 500.0;
const DEFAULT_WINDOW_WIDTH: u32 = 960;
const DEFAULT_WINDOW_HEIGHT: u32 = 540;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
///
/// The [`apply_gameconfig_changes`] system pushes these values into the
/// physics, collision and sprite resources whenever the config changes.
///
/// [`apply_gameconfig_changes`]: crate::systems::gameconfig::apply_gameconfig_changes
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Sprite configuration id chosen by the player.
    pub selected_pet: String,
    /// Directory relative sheet URLs resolve against.
    pub asset_root: PathBuf,
    /// Sheet id → source, in the order of the built-in sheets.
    pub sheet_urls: Vec<(String, String)>,
    /// Tile edge in pixels.
    pub tile_size: f32,
    /// Downward acceleration in px/s².
    pub gravity: f32,
    /// Terminal falling speed in px/s.
    pub max_fall_speed: f32,
    /// Start with debug overlays on.
    pub debug: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn sheet_key(sheet_id: &str) -> String {
    format!("sheet_{}", sheet_id.to_lowercase())
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            selected_pet: DEFAULT_CONFIG_ID.to_string(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            sheet_urls: DEFAULT_SHEETS
                .iter()
                .map(|(id, url)| (id.to_string(), url.to_string()))
                .collect(),
            tile_size: DEFAULT_TILE_SIZE,
            gravity: DEFAULT_GRAVITY,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED,
            debug: false,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [sprites] section
        if let Some(pet) = config.get("sprites", "selected_pet") {
            self.selected_pet = pet;
        }
        if let Some(root) = config.get("sprites", "asset_root") {
            self.asset_root = PathBuf::from(root);
        }
        for (id, url) in self.sheet_urls.iter_mut() {
            if let Some(value) = config.get("sprites", &sheet_key(id)) {
                *url = value;
            }
        }

        // [collision] section
        if let Some(size) = config.getfloat("collision", "tile_size").ok().flatten() {
            if size.is_finite() && size > 0.0 {
                self.tile_size = size as f32;
            } else {
                warn!(
                    "Ignoring invalid tile_size {} in {}, keeping {}",
                    size,
                    self.config_path.display(),
                    self.tile_size
                );
            }
        }

        // [physics] section
        if let Some(gravity) = config.getfloat("physics", "gravity").ok().flatten() {
            self.gravity = gravity as f32;
        }
        if let Some(max) = config.getfloat("physics", "max_fall_speed").ok().flatten() {
            self.max_fall_speed = max as f32;
        }

        // [debug] section
        if let Some(enabled) = config.getbool("debug", "enabled").ok().flatten() {
            self.debug = enabled;
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }

        info!(
            "Loaded config: pet={}, assets={:?}, tile={}, gravity={}, max_fall={}, debug={}",
            self.selected_pet,
            self.asset_root,
            self.tile_size,
            self.gravity,
            self.max_fall_speed,
            self.debug
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [sprites] section
        config.set("sprites", "selected_pet", Some(self.selected_pet.clone()));
        config.set(
            "sprites",
            "asset_root",
            Some(self.asset_root.to_string_lossy().into_owned()),
        );
        for (id, url) in &self.sheet_urls {
            config.set("sprites", &sheet_key(id), Some(url.clone()));
        }

        // [collision] section
        config.set("collision", "tile_size", Some(self.tile_size.to_string()));

        // [physics] section
        config.set("physics", "gravity", Some(self.gravity.to_string()));
        config.set(
            "physics",
            "max_fall_speed",
            Some(self.max_fall_speed.to_string()),
        );

        // [debug] section
        config.set("debug", "enabled", Some(self.debug.to_string()));

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Remember `pet_id` as the player's choice and write it out.
    ///
    /// Only `[sprites] selected_pet` is touched on disk; every other key in
    /// the file stays as it was. A failed write is logged and the in-memory
    /// value is kept either way.
    pub fn persist_selected_pet(&mut self, pet_id: &str) {
        self.selected_pet = pet_id.to_string();
        let mut config = Ini::new();
        if self.config_path.exists() {
            if let Err(e) = config.load(&self.config_path) {
                warn!("Could not read {:?} before saving: {}", self.config_path, e);
            }
        }
        config.set("sprites", "selected_pet", Some(self.selected_pet.clone()));
        match config.write(&self.config_path) {
            Ok(()) => info!("Saved selected pet {} to {:?}", pet_id, self.config_path),
            Err(e) => warn!("Could not persist selected pet {}: {}", pet_id, e),
        }
    }

    /// Sheet id → source pairs for [`SpriteSystem::load_all_sheets`].
    ///
    /// [`SpriteSystem::load_all_sheets`]: crate::resources::spritesystem::SpriteSystem::load_all_sheets
    pub fn sheet_overrides(&self) -> Vec<(&str, &str)> {
        self.sheet_urls
            .iter()
            .map(|(id, url)| (id.as_str(), url.as_str()))
            .collect()
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
