//! Sprite configurations: which sheet cell shows which animation state.
//!
//! A [`SpriteConfiguration`] maps the nine cells of a 3×3 sprite sheet to
//! animation states. The [`SpriteConfigStore`] keeps every known
//! configuration (the built-in pets, the dog NPC and anything imported) and
//! remembers which one is current for the session.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "id": "pet-a",
//!   "sheet": "A",
//!   "cells": [
//!     {"r": 1, "c": 1, "crop": [0, 0, 32, 32], "assign": "dodge_roll", "pivot": [0.5, 1], "flipX": false}
//!   ],
//!   "fireball": null
//! }
//! ```

use glam::Vec2;
use log::{error, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::animation::{AnimState, REQUIRED_ANIMATIONS};

/// Default configuration every lookup miss falls back to.
pub const DEFAULT_CONFIG_ID: &str = "pet-a";
/// Version tag written into exported configurations.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Errors from adding, importing, exporting or selecting configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration {id} is missing required animations: {}", join_states(.missing))]
    Invalid { id: String, missing: Vec<AnimState> },
    #[error("malformed configuration: {0}")]
    Malformed(String),
    #[error("no configuration to export")]
    NothingToExport,
    #[error("configuration not found: {0}")]
    UnknownConfig(String),
}

fn join_states(states: &[AnimState]) -> String {
    states
        .iter()
        .map(AnimState::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pixel rectangle inside a sheet. Serialized as `[x, y, w, h]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CropRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

impl From<[f32; 4]> for CropRect {
    fn from([x, y, w, h]: [f32; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<CropRect> for [f32; 4] {
    fn from(r: CropRect) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Bottom-centre: sprites stand on their pivot.
pub const DEFAULT_PIVOT: Vec2 = Vec2::new(0.5, 1.0);

fn default_pivot() -> Vec2 {
    DEFAULT_PIVOT
}

/// One sheet cell and the animation state it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteCellMapping {
    #[serde(rename = "r")]
    pub row: u32,
    #[serde(rename = "c")]
    pub col: u32,
    pub crop: CropRect,
    #[serde(rename = "assign")]
    pub assigned_state: AnimState,
    /// Normalized anchor inside the sprite box.
    #[serde(default = "default_pivot")]
    pub pivot: Vec2,
    #[serde(rename = "flipX", default)]
    pub flip_x: bool,
}

/// Named set of cell mappings for one sprite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfiguration {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Asset path of the sheet image, when known.
    #[serde(rename = "spriteSheet", default, skip_serializing_if = "Option::is_none")]
    pub sprite_sheet: Option<String>,
    pub sheet: String,
    #[serde(default)]
    pub cells: Vec<SpriteCellMapping>,
    #[serde(default)]
    pub fireball: Option<SpriteCellMapping>,
}

/// Outcome of [`validate_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    /// Required states absent from the configuration, in required order.
    pub missing: Vec<AnimState>,
    pub error: Option<String>,
}

/// Check that `config` maps every state in [`REQUIRED_ANIMATIONS`].
pub fn validate_config(config: &SpriteConfiguration) -> ValidationReport {
    let missing: Vec<AnimState> = REQUIRED_ANIMATIONS
        .iter()
        .filter(|state| !config.cells.iter().any(|c| &c.assigned_state == *state))
        .cloned()
        .collect();

    let error = if missing.is_empty() {
        None
    } else {
        Some(format!("Missing required animations: {}", join_states(&missing)))
    };

    ValidationReport {
        valid: missing.is_empty(),
        missing,
        error,
    }
}

/// Layout shared by both pet sheets, row-major over the 3×3 grid.
const PET_LAYOUT: [AnimState; 9] = [
    AnimState::DodgeRoll,
    AnimState::Run1,
    AnimState::IdleSit,
    AnimState::Run2,
    AnimState::Run3,
    AnimState::IdleSitFront,
    AnimState::Crouch,
    AnimState::JumpUp,
    AnimState::FallDown,
];

const NOMINAL_CELL: f32 = 32.0;

fn grid_cells(states: &[AnimState]) -> Vec<SpriteCellMapping> {
    states
        .iter()
        .enumerate()
        .map(|(idx, state)| {
            let r = (idx / 3) as u32;
            let c = (idx % 3) as u32;
            SpriteCellMapping {
                row: r + 1,
                col: c + 1,
                crop: CropRect::new(
                    c as f32 * NOMINAL_CELL,
                    r as f32 * NOMINAL_CELL,
                    NOMINAL_CELL,
                    NOMINAL_CELL,
                ),
                assigned_state: state.clone(),
                pivot: DEFAULT_PIVOT,
                flip_x: false,
            }
        })
        .collect()
}

/// Pet A (Bowie the cat), sheet `A`.
pub fn default_pet_a() -> SpriteConfiguration {
    SpriteConfiguration {
        id: "pet-a".to_string(),
        name: Some("Bowie Cat".to_string()),
        sprite_sheet: Some("bowie_cat_3x3.png".to_string()),
        sheet: "A".to_string(),
        cells: grid_cells(&PET_LAYOUT),
        fireball: None,
    }
}

/// Pet B (Buttercup the cat), same layout on sheet `B`.
pub fn default_pet_b() -> SpriteConfiguration {
    SpriteConfiguration {
        id: "pet-b".to_string(),
        name: Some("Buttercup Cat".to_string()),
        sprite_sheet: Some("happy_buttercup_cat_3x3.png".to_string()),
        sheet: "B".to_string(),
        cells: grid_cells(&PET_LAYOUT),
        fireball: None,
    }
}

/// Dog NPC. Only the top row is used and it is not a full pet mapping.
pub fn dog_mapping() -> SpriteConfiguration {
    SpriteConfiguration {
        id: "dog".to_string(),
        name: Some("Bonbon Dog".to_string()),
        sprite_sheet: Some("bonbon_dog_3x3.png".to_string()),
        sheet: "dog".to_string(),
        cells: grid_cells(&[AnimState::Idle, AnimState::Run1, AnimState::Run2]),
        fireball: None,
    }
}

fn resolve_alias(id: &str) -> &str {
    match id {
        "A" => "pet-a",
        "B" => "pet-b",
        other => other,
    }
}

/// Exported configuration: the configuration plus export metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedConfiguration<'a> {
    #[serde(flatten)]
    config: &'a SpriteConfiguration,
    exported_at: String,
    version: &'static str,
}

/// Every known configuration plus the session's current selection.
#[derive(Debug, Clone)]
pub struct SpriteConfigStore {
    configs: FxHashMap<String, SpriteConfiguration>,
    current: String,
}

impl Default for SpriteConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteConfigStore {
    /// Store holding `pet-a`, `pet-b` and `dog`, with `pet-a` current.
    pub fn new() -> Self {
        let mut configs = FxHashMap::default();
        for config in [default_pet_a(), default_pet_b(), dog_mapping()] {
            configs.insert(config.id.clone(), config);
        }
        Self {
            configs,
            current: DEFAULT_CONFIG_ID.to_string(),
        }
    }

    /// Select a configuration by id or alias (`A`, `B`).
    ///
    /// Unknown ids log a warning and return `pet-a` while leaving the current
    /// selection untouched. Use [`try_load_config`](Self::try_load_config)
    /// to tell a miss apart.
    pub fn load_config(&mut self, id: &str) -> &SpriteConfiguration {
        if self.try_load_config(id).is_err() {
            warn!(
                "Configuration not found: {} ({}), using {} as fallback",
                id,
                resolve_alias(id),
                DEFAULT_CONFIG_ID
            );
            return self.default_config();
        }
        self.current_config()
    }

    /// Select a configuration by id or alias, failing on a miss.
    pub fn try_load_config(&mut self, id: &str) -> Result<&SpriteConfiguration, ConfigError> {
        let config_id = resolve_alias(id);
        if !self.configs.contains_key(config_id) {
            return Err(ConfigError::UnknownConfig(id.to_string()));
        }
        self.current = config_id.to_string();
        let config = self.current_config();
        info!(
            "Loaded config: {} ({})",
            config.name.as_deref().unwrap_or("unnamed"),
            config.id
        );
        Ok(config)
    }

    fn default_config(&self) -> &SpriteConfiguration {
        // pet-a can be replaced but never removed.
        &self.configs[DEFAULT_CONFIG_ID]
    }

    /// Exact-match search over the cells of `config`, or the current one.
    pub fn get_mapping_by_state<'a>(
        &'a self,
        state: &AnimState,
        config: Option<&'a SpriteConfiguration>,
    ) -> Option<&'a SpriteCellMapping> {
        let search = config.unwrap_or_else(|| self.current_config());
        search.cells.iter().find(|cell| &cell.assigned_state == state)
    }

    /// Mapping for a player state at a frame; `run` cycles `run_1..run_3`.
    pub fn get_mapping_for_player_state(
        &self,
        state: &AnimState,
        frame_index: usize,
    ) -> Option<&SpriteCellMapping> {
        self.get_mapping_by_state(&state.cell_for_frame(frame_index), None)
    }

    /// Same as [`get_mapping_for_player_state`](Self::get_mapping_for_player_state)
    /// but against a named configuration instead of the current one.
    pub fn get_mapping_in(
        &self,
        config_id: &str,
        state: &AnimState,
        frame_index: usize,
    ) -> Option<&SpriteCellMapping> {
        let config = self.get_config_for_pet(config_id)?;
        self.get_mapping_by_state(&state.cell_for_frame(frame_index), Some(config))
    }

    pub fn validate_config(&self, config: &SpriteConfiguration) -> ValidationReport {
        validate_config(config)
    }

    /// Store a copy of `config` under `id` if it maps every required state.
    pub fn add_config(&mut self, id: &str, config: &SpriteConfiguration) -> Result<(), ConfigError> {
        let report = validate_config(config);
        if !report.valid {
            error!(
                "Cannot add config {}: {}",
                id,
                report.error.as_deref().unwrap_or("invalid")
            );
            return Err(ConfigError::Invalid {
                id: id.to_string(),
                missing: report.missing,
            });
        }

        let mut stored = config.clone();
        stored.id = id.to_string();
        self.configs.insert(id.to_string(), stored);
        Ok(())
    }

    /// Serialize a configuration (or the current one) as pretty JSON.
    pub fn export_config(&self, id: Option<&str>) -> Result<String, ConfigError> {
        let config = match id {
            Some(id) => self.configs.get(resolve_alias(id)),
            None => Some(self.current_config()),
        }
        .ok_or(ConfigError::NothingToExport)?;

        let exported = ExportedConfiguration {
            config,
            exported_at: chrono::Utc::now().to_rfc3339(),
            version: EXPORT_VERSION,
        };
        serde_json::to_string_pretty(&exported).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Parse a JSON configuration and store it under `id`.
    pub fn import_config(&mut self, json: &str, id: &str) -> Result<(), ConfigError> {
        let config: SpriteConfiguration = serde_json::from_str(json).map_err(|e| {
            error!("Failed to import config {}: {}", id, e);
            ConfigError::Malformed(e.to_string())
        })?;
        self.add_config(id, &config)
    }

    pub fn current_config(&self) -> &SpriteConfiguration {
        self.configs
            .get(&self.current)
            .unwrap_or_else(|| self.default_config())
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    /// Sheet id of the current configuration.
    pub fn current_sheet(&self) -> &str {
        &self.current_config().sheet
    }

    pub fn get_config_for_pet(&self, id: &str) -> Option<&SpriteConfiguration> {
        self.configs.get(resolve_alias(id))
    }

    /// Mutable access for post-load geometry fixes.
    pub fn configs_for_sheet_mut<'a>(
        &'a mut self,
        sheet_id: &'a str,
    ) -> impl Iterator<Item = &'a mut SpriteConfiguration> + 'a {
        self.configs.values_mut().filter(move |c| c.sheet == sheet_id)
    }

    /// Make `pet-a` current again.
    pub fn reset(&mut self) {
        self.current = DEFAULT_CONFIG_ID.to_string();
    }

    /// Ids of every stored configuration, sorted.
    pub fn available_configs(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.configs.keys().cloned().collect();
        ids.sort();
        ids
    }
}
