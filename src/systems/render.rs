//! Render pass.
//!
//! Draws the level and every sprite-animated entity into any
//! [`DrawContext`]. Runs outside the tick schedule because it needs the
//! drawing surface, which is not an ECS resource.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::animation::AnimationController;
use crate::components::body::Body;
use crate::components::spriteappearance::SpriteAppearance;
use crate::components::zindex::ZIndex;
use crate::render::context::{Color, DrawContext, Rect};
use crate::resources::camera::CameraOffset;
use crate::resources::debugmode::DebugMode;
use crate::resources::spritesystem::SpriteSystem;
use crate::resources::tilecollision::{TileCollision, TileKind};
use crate::resources::worldtime::WorldTime;

/// Flat color for a tile kind; `None` for tiles that draw nothing.
pub fn tile_color(kind: TileKind) -> Option<Color> {
    match kind {
        TileKind::Solid => Some(Color::new(96, 72, 48, 255)),
        TileKind::MovingPlatform => Some(Color::new(150, 110, 60, 255)),
        TileKind::Collectible => Some(Color::new(240, 200, 40, 255)),
        TileKind::Climbable => Some(Color::new(60, 160, 60, 255)),
        TileKind::Checkpoint => Some(Color::new(60, 120, 220, 255)),
        TileKind::Goal => Some(Color::new(220, 60, 200, 255)),
        TileKind::Pit | TileKind::OutOfBounds | TileKind::Unknown(_) => None,
    }
}

/// Draw the level grid as flat tiles, shifted by the camera.
pub fn render_level(world: &World, ctx: &mut dyn DrawContext) {
    let Some(tiles) = world.get_resource::<TileCollision>() else {
        return;
    };
    let Some(grid) = tiles.level() else {
        return;
    };
    let camera = world
        .get_resource::<CameraOffset>()
        .copied()
        .unwrap_or_default()
        .0;
    let ts = tiles.tile_size;

    for (ty, row) in grid.rows().iter().enumerate() {
        for (tx, code) in row.iter().enumerate() {
            if let Some(color) = tile_color(TileKind::from_code(*code)) {
                let x = tx as f32 * ts - camera.x;
                let y = ty as f32 * ts - camera.y;
                ctx.fill_rect(Rect::new(x, y, ts, ts), color);
            }
        }
    }
}

/// Draw every entity with a [`Body`] and an [`AnimationController`].
///
/// Entities are sorted by [`ZIndex`]. With [`DebugMode`] present each one
/// also gets its collision box and a state label.
pub fn render_pass(world: &mut World, ctx: &mut dyn DrawContext) {
    let camera = world
        .get_resource::<CameraOffset>()
        .copied()
        .unwrap_or_default()
        .0;
    let time_ms = world
        .get_resource::<WorldTime>()
        .map_or(0.0, WorldTime::elapsed_ms);
    let debug = world.contains_resource::<DebugMode>();

    let mut to_draw: Vec<(Body, AnimationController, SpriteAppearance, ZIndex)> = {
        let mut q = world.query::<(
            &Body,
            &AnimationController,
            Option<&SpriteAppearance>,
            Option<&ZIndex>,
        )>();
        q.iter(world)
            .map(|(b, c, a, z)| {
                (
                    *b,
                    c.clone(),
                    a.cloned().unwrap_or_default(),
                    z.copied().unwrap_or_default(),
                )
            })
            .collect()
    };
    to_draw.sort_by_key(|(_, _, _, z)| *z);

    render_level(world, ctx);

    let Some(sprites) = world.get_resource::<SpriteSystem>() else {
        return;
    };
    for (body, controller, appearance, _z) in to_draw.iter() {
        let screen = body.position() - camera;
        sprites.render_entity(
            ctx,
            controller,
            appearance,
            screen.x,
            screen.y,
            body.width,
            body.height,
            time_ms,
        );

        if debug {
            let renderer = sprites.renderer();
            renderer.render_debug_box(ctx, screen.x, screen.y, body.width, body.height, Color::GREEN);
            let label = format!(
                "{}:{}",
                controller.current_state(),
                controller.current_frame()
            );
            renderer.render_debug_text(ctx, &label, screen.x, screen.y - 4.0);
        }
    }
}

/// Screen-space diagnostics. Only with [`DebugMode`].
pub fn render_debug_ui(world: &mut World, ctx: &mut dyn DrawContext) {
    if !world.contains_resource::<DebugMode>() {
        return;
    }

    ctx.draw_text("DEBUG MODE (press F11 to toggle)", 10.0, 10.0, 10.0, Color::BLACK);

    let entity_count = world.query::<&Body>().iter(world).count();
    ctx.draw_text(
        &format!("Bodies: {}", entity_count),
        10.0,
        30.0,
        10.0,
        Color::BLACK,
    );

    let camera: Vec2 = world
        .get_resource::<CameraOffset>()
        .copied()
        .unwrap_or_default()
        .0;
    ctx.draw_text(
        &format!("Camera pos: ({:.1}, {:.1})", camera.x, camera.y),
        10.0,
        50.0,
        10.0,
        Color::BLACK,
    );

    if let Some(sprites) = world.get_resource::<SpriteSystem>() {
        let stats = sprites.stats();
        ctx.draw_text(
            &format!(
                "Pet: {} | sheets {}/{}",
                stats.config.current_pet, stats.sheets.loaded_sheets, stats.sheets.total_sheets
            ),
            10.0,
            70.0,
            10.0,
            Color::BLACK,
        );
    }
}
