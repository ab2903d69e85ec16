//! Sprite pipeline facade.
//!
//! [`SpriteSystem`] is the ECS resource that owns the configuration store, the
//! sheet manager and the renderer, and keeps them consistent: finished URL
//! loads rescale the crops of every configuration drawn from that sheet,
//! and sprite lookups combine the current (or a per-entity) configuration
//! with the loaded sheet image.
//!
//! It also carries one [`AnimationController`] of its own for callers that
//! drive a single sprite without an ECS entity (the CLI, previews). Entities
//! carry their own controller component and go through
//! [`SpriteSystem::render_entity`].

use std::path::PathBuf;
use std::time::Duration;

use bevy_ecs::prelude::Resource;
use image::RgbaImage;
use log::{debug, warn};
use serde::Serialize;

use crate::components::animation::{AnimState, AnimationController};
use crate::components::spriteappearance::SpriteAppearance;
use crate::events::sheetload::SheetLoadEvent;
use crate::render::context::DrawContext;
use crate::render::sprite_renderer::{RenderOptions, Sprite, SpriteRenderer};
use crate::resources::spriteconfig::{SpriteConfigStore, SpriteConfiguration};
use crate::resources::spritesheets::{
    LoadHandle, SheetError, SheetFile, SheetStats, SpriteSheetManager,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStats {
    pub current_pet: String,
    pub current_sheet: String,
    pub available_configs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationStats {
    pub state: AnimState,
    pub frame: usize,
    pub progress: f32,
}

/// Snapshot of the whole pipeline, serializable for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteSystemStats {
    pub sheets: SheetStats,
    pub config: ConfigStats,
    pub animation: AnimationStats,
}

#[derive(Resource)]
pub struct SpriteSystem {
    config: SpriteConfigStore,
    sheets: SpriteSheetManager,
    renderer: SpriteRenderer,
    animation: AnimationController,
}

impl Default for SpriteSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteSystem {
    pub fn new() -> Self {
        Self::with_asset_root(".")
    }

    /// Facade whose sheet URLs resolve under `asset_root`.
    pub fn with_asset_root(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            config: SpriteConfigStore::new(),
            sheets: SpriteSheetManager::with_asset_root(asset_root),
            renderer: SpriteRenderer::new(),
            animation: AnimationController::new(),
        }
    }

    pub fn config(&self) -> &SpriteConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SpriteConfigStore {
        &mut self.config
    }

    pub fn sheets(&self) -> &SpriteSheetManager {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut SpriteSheetManager {
        &mut self.sheets
    }

    pub fn renderer(&self) -> &SpriteRenderer {
        &self.renderer
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn load_all_sheets(&mut self, overrides: &[(&str, &str)]) -> Vec<LoadHandle> {
        self.sheets.load_all_sheets(overrides)
    }

    pub fn load_sheet(&mut self, sheet_id: &str, file: &SheetFile) -> Result<LoadHandle, SheetError> {
        self.sheets.load_sheet(sheet_id, file)
    }

    pub fn load_sheet_from_url(&mut self, sheet_id: &str, url: &str) -> LoadHandle {
        self.sheets.load_sheet_from_url(sheet_id, url)
    }

    /// Apply finished loads. Non-blocking; call once per tick.
    pub fn poll_loads(&mut self) -> Vec<SheetLoadEvent> {
        let events = self.sheets.poll();
        self.apply_crops(&events);
        events
    }

    /// Block until every pending load finished or `timeout` elapsed.
    pub fn finish_loads(&mut self, timeout: Duration) -> Vec<SheetLoadEvent> {
        let events = self.sheets.wait_for_loads(timeout);
        self.apply_crops(&events);
        events
    }

    fn apply_crops(&mut self, events: &[SheetLoadEvent]) {
        for event in events {
            if let SheetLoadEvent::Loaded {
                sheet_id,
                width,
                height,
                crops_recalculated: true,
                ..
            } = event
            {
                for config in self.config.configs_for_sheet_mut(sheet_id) {
                    SpriteSheetManager::calculate_crop_coordinates(config, *width, *height);
                }
            }
        }
    }

    /// Make `pet_id` (or its alias) the current configuration.
    pub fn switch_pet(&mut self, pet_id: &str) -> &SpriteConfiguration {
        self.config.load_config(pet_id)
    }

    /// Sprite for `state` at `frame` from the current configuration.
    pub fn sprite_for_state(&self, state: &AnimState, frame: usize) -> Option<Sprite> {
        self.sprite_for_skin(None, state, frame)
    }

    /// Sprite for `state` at `frame` drawn with the `skin` configuration, or
    /// the current one when `skin` is `None`.
    pub fn sprite_for_skin(
        &self,
        skin: Option<&str>,
        state: &AnimState,
        frame: usize,
    ) -> Option<Sprite> {
        let (mapping, sheet_id) = match skin {
            Some(skin) => {
                let sheet_id = self.config.get_config_for_pet(skin)?.sheet.as_str();
                (self.config.get_mapping_in(skin, state, frame), sheet_id)
            }
            None => (
                self.config.get_mapping_for_player_state(state, frame),
                self.config.current_sheet(),
            ),
        };

        let Some(mapping) = mapping else {
            warn!("No mapping found for state: {}", state);
            return None;
        };
        let sheet = self.sheets.get_sheet(sheet_id);
        if !sheet.is_some_and(|s| s.loaded()) {
            debug!("Sheet not loaded: {}", sheet_id);
            return None;
        }
        self.renderer.get_sprite(sheet_id, sheet, Some(mapping))
    }

    pub fn update_animation(&mut self, delta_ms: f32, state: Option<AnimState>) {
        self.animation.update(delta_ms, state);
    }

    pub fn get_animation_state(&self) -> &AnimState {
        self.animation.current_state()
    }

    pub fn set_animation_state(&mut self, state: AnimState, reset_frame: bool) {
        self.animation.set_state(state, reset_frame);
    }

    pub fn get_animation_frame(&self) -> usize {
        self.animation.current_frame()
    }

    /// Draw the facade's own animation at the given box.
    pub fn render(
        &self,
        ctx: &mut dyn DrawContext,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        options: &RenderOptions,
    ) {
        let sprite = self.sprite_for_state(
            self.animation.current_state(),
            self.animation.current_frame(),
        );
        self.renderer
            .render(ctx, sprite.as_ref(), x, y, width, height, options);
    }

    /// Draw one entity from its own controller and appearance.
    #[allow(clippy::too_many_arguments)]
    pub fn render_entity(
        &self,
        ctx: &mut dyn DrawContext,
        controller: &AnimationController,
        appearance: &SpriteAppearance,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        time_ms: f64,
    ) {
        let sprite = self.sprite_for_skin(
            appearance.skin.as_deref(),
            controller.current_state(),
            controller.current_frame(),
        );
        let options = RenderOptions::default()
            .facing(appearance.facing)
            .invulnerable(appearance.invulnerable)
            .alpha(appearance.alpha)
            .at_time(time_ms);
        self.renderer
            .render(ctx, sprite.as_ref(), x, y, width, height, &options);
    }

    pub fn generate_preview(&self, sheet_id: &str, size: u32) -> Option<RgbaImage> {
        self.sheets.generate_preview(sheet_id, size)
    }

    /// Every known sheet has an image.
    pub fn are_sheets_loaded(&self) -> bool {
        self.sheets.get_stats().loading_progress >= 1.0
    }

    pub fn stats(&self) -> SpriteSystemStats {
        SpriteSystemStats {
            sheets: self.sheets.get_stats(),
            config: ConfigStats {
                current_pet: self.config.current_id().to_string(),
                current_sheet: self.config.current_sheet().to_string(),
                available_configs: self.config.available_configs(),
            },
            animation: AnimationStats {
                state: self.animation.current_state().clone(),
                frame: self.animation.current_frame(),
                progress: self.animation.progress(),
            },
        }
    }

    pub fn enable_debug(&mut self) {
        self.renderer.enable_debug();
    }

    pub fn disable_debug(&mut self) {
        self.renderer.disable_debug();
    }

    /// Back to `pet-a` and a fresh animation. Loaded sheets are kept.
    pub fn reset(&mut self) {
        self.config.reset();
        self.animation.reset();
    }

    /// Unload every sheet.
    pub fn clear(&mut self) {
        self.sheets.clear();
    }
}
