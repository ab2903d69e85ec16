//! Event and observer for choosing the player's pet.
//!
//! Triggering a [`PetSelectedEvent`] makes that configuration current in the
//! [`SpriteSystem`] and, when a [`GameConfig`] is present, persists the choice
//! as `[sprites] selected_pet`. Unknown ids keep the current selection and
//! are not persisted.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::warn;

use crate::resources::gameconfig::GameConfig;
use crate::resources::spritesystem::SpriteSystem;

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PetSelectedEvent {
    /// Configuration id or alias (`A`, `B`).
    pub pet_id: String,
}

impl PetSelectedEvent {
    pub fn new(pet_id: impl Into<String>) -> Self {
        Self {
            pet_id: pet_id.into(),
        }
    }
}

pub fn pet_selected_observer(
    trigger: On<PetSelectedEvent>,
    mut sprites: ResMut<SpriteSystem>,
    config: Option<ResMut<GameConfig>>,
) {
    let requested = trigger.event().pet_id.as_str();
    let selected = match sprites.config_mut().try_load_config(requested) {
        Ok(selected) => selected.id.clone(),
        Err(e) => {
            warn!("Ignoring pet selection: {}", e);
            return;
        }
    };

    if let Some(mut config) = config {
        config.persist_selected_pet(&selected);
    }
}
