//! Sprite drawing pipeline.
//!
//! [`SpriteRenderer::render`] places a sheet cell so that its pivot lands on
//! the pivot point of the entity box, flips it when facing left and crops the
//! sheet to the cell. Missing assets draw a plain rectangle instead so a
//! failed load never hides an entity.

use glam::Vec2;

use super::context::{Color, CompositeOp, DrawContext, Rect};
use crate::components::spriteappearance::Facing;
use crate::resources::spriteconfig::{CropRect, DEFAULT_PIVOT, SpriteCellMapping};
use crate::resources::spritesheets::{SheetImage, SpriteSheet};

/// A drawable cell: the sheet image, the region to crop and its pivot.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub sheet_id: String,
    pub image: SheetImage,
    pub crop: CropRect,
    pub pivot: Option<Vec2>,
}

/// Per-draw options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub facing: Facing,
    /// Flash between full and half opacity.
    pub invulnerable: bool,
    pub alpha: f32,
    /// Overrides the sprite's own pivot.
    pub pivot: Option<Vec2>,
    /// Game clock in milliseconds; drives the invulnerability flash.
    pub time_ms: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            facing: Facing::Right,
            invulnerable: false,
            alpha: 1.0,
            pivot: None,
            time_ms: 0.0,
        }
    }
}

impl RenderOptions {
    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn invulnerable(mut self, invulnerable: bool) -> Self {
        self.invulnerable = invulnerable;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn pivot(mut self, pivot: Vec2) -> Self {
        self.pivot = Some(pivot);
        self
    }

    pub fn at_time(mut self, time_ms: f64) -> Self {
        self.time_ms = time_ms;
        self
    }
}

/// Opacity of an invulnerable sprite at game time `time_ms`.
pub fn flash_alpha(time_ms: f64) -> f32 {
    if (time_ms * 0.01).sin() > 0.0 { 1.0 } else { 0.5 }
}

#[derive(Debug, Clone, Default)]
pub struct SpriteRenderer {
    debug: bool,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    pub fn disable_debug(&mut self) {
        self.debug = false;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Draw `sprite` into the box `(x, y, w, h)`, or a fallback rectangle
    /// when there is no sprite.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        ctx: &mut dyn DrawContext,
        sprite: Option<&Sprite>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        options: &RenderOptions,
    ) {
        ctx.save();

        if options.invulnerable {
            ctx.set_global_alpha(flash_alpha(options.time_ms));
        } else if options.alpha != 1.0 {
            ctx.set_global_alpha(options.alpha);
        }

        match sprite {
            Some(sprite) => {
                let pivot = options.pivot.or(sprite.pivot).unwrap_or(DEFAULT_PIVOT);
                ctx.translate(x + width * pivot.x, y + height * pivot.y);
                if options.facing == Facing::Left {
                    ctx.scale(-1.0, 1.0);
                }
                ctx.draw_image(
                    &sprite.sheet_id,
                    &sprite.image,
                    sprite.crop,
                    Rect::new(-width * pivot.x, -height * pivot.y, width, height),
                );
                if self.debug {
                    ctx.fill_rect(Rect::new(-2.0, -2.0, 4.0, 4.0), Color::MAGENTA);
                }
            }
            None => {
                let color = if options.invulnerable {
                    Color::RED
                } else {
                    Color::WHITE
                };
                self.render_fallback(ctx, x, y, width, height, color);
            }
        }

        ctx.restore();
    }

    /// Solid rectangle standing in for a missing sprite.
    pub fn render_fallback(
        &self,
        ctx: &mut dyn DrawContext,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) {
        ctx.save();
        ctx.fill_rect(Rect::new(x, y, width, height), color);
        ctx.restore();
    }

    /// [`render`](Self::render) with world coordinates shifted by `camera`.
    #[allow(clippy::too_many_arguments)]
    pub fn render_with_camera(
        &self,
        ctx: &mut dyn DrawContext,
        sprite: Option<&Sprite>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        camera: Vec2,
        options: &RenderOptions,
    ) {
        self.render(ctx, sprite, x - camera.x, y - camera.y, width, height, options);
    }

    /// Rotate the sprite by `rotation` radians about the centre of its box.
    #[allow(clippy::too_many_arguments)]
    pub fn render_rotated(
        &self,
        ctx: &mut dyn DrawContext,
        sprite: Option<&Sprite>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: f32,
        options: &RenderOptions,
    ) {
        ctx.save();
        ctx.translate(x + width / 2.0, y + height / 2.0);
        ctx.rotate(rotation);
        let centred = options.pivot(Vec2::ZERO);
        self.render(
            ctx,
            sprite,
            -width / 2.0,
            -height / 2.0,
            width,
            height,
            &centred,
        );
        ctx.restore();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render_scaled(
        &self,
        ctx: &mut dyn DrawContext,
        sprite: Option<&Sprite>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        scale: Vec2,
        options: &RenderOptions,
    ) {
        self.render(
            ctx,
            sprite,
            x,
            y,
            width * scale.x,
            height * scale.y,
            options,
        );
    }

    /// Render, then multiply `tint` over the entity box.
    #[allow(clippy::too_many_arguments)]
    pub fn render_tinted(
        &self,
        ctx: &mut dyn DrawContext,
        sprite: Option<&Sprite>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        tint: Color,
        options: &RenderOptions,
    ) {
        ctx.save();
        self.render(ctx, sprite, x, y, width, height, options);
        ctx.set_composite(CompositeOp::Multiply);
        ctx.fill_rect(Rect::new(x, y, width, height), tint);
        ctx.restore();
    }

    /// Combine a loaded sheet with a cell mapping; `None` if either is missing.
    pub fn get_sprite(
        &self,
        sheet_id: &str,
        sheet: Option<&SpriteSheet>,
        mapping: Option<&SpriteCellMapping>,
    ) -> Option<Sprite> {
        let image = sheet?.image.as_ref()?;
        let mapping = mapping?;
        Some(Sprite {
            sheet_id: sheet_id.to_string(),
            image: image.clone(),
            crop: mapping.crop,
            pivot: Some(mapping.pivot),
        })
    }

    /// Outline plus centre dot. Debug mode only.
    pub fn render_debug_box(
        &self,
        ctx: &mut dyn DrawContext,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) {
        if !self.debug {
            return;
        }
        ctx.save();
        ctx.stroke_rect(Rect::new(x, y, width, height), color, 1.0);
        ctx.fill_rect(
            Rect::new(x + width / 2.0 - 1.0, y + height / 2.0 - 1.0, 2.0, 2.0),
            color,
        );
        ctx.restore();
    }

    /// Small label. Debug mode only.
    pub fn render_debug_text(&self, ctx: &mut dyn DrawContext, text: &str, x: f32, y: f32) {
        if !self.debug {
            return;
        }
        ctx.save();
        ctx.draw_text(text, x, y, 10.0, Color::WHITE);
        ctx.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recorder::{DrawCall, RecordingContext};
    use image::RgbaImage;

    fn sprite() -> Sprite {
        Sprite {
            sheet_id: "A".into(),
            image: SheetImage::new(RgbaImage::new(96, 96)),
            crop: CropRect::new(0.0, 0.0, 32.0, 32.0),
            pivot: Some(DEFAULT_PIVOT),
        }
    }

    fn is_transform(call: &DrawCall) -> bool {
        matches!(
            call,
            DrawCall::Translate(..) | DrawCall::Scale(..) | DrawCall::Rotate(_)
        )
    }

    #[test]
    fn test_missing_sprite_draws_single_fallback_rect() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        renderer.render(&mut ctx, None, 10.0, 20.0, 30.0, 40.0, &RenderOptions::default());

        let fills: Vec<&DrawCall> = ctx
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillRect { .. }))
            .collect();
        assert_eq!(fills.len(), 1);
        let DrawCall::FillRect { rect, color, .. } = fills[0] else {
            unreachable!()
        };
        assert_eq!(*rect, Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(*color, Color::WHITE);
        assert_eq!(ctx.count(is_transform), 0);
        assert_eq!(ctx.stack_depth(), 0);
    }

    #[test]
    fn test_invulnerable_fallback_is_red() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        let opts = RenderOptions::default().invulnerable(true);
        renderer.render(&mut ctx, None, 0.0, 0.0, 8.0, 8.0, &opts);
        assert!(ctx.calls.iter().any(|c| matches!(
            c,
            DrawCall::FillRect {
                color: Color::RED,
                ..
            }
        )));
    }

    #[test]
    fn test_sprite_drawn_at_pivot() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        renderer.render(
            &mut ctx,
            Some(&sprite()),
            100.0,
            200.0,
            30.0,
            30.0,
            &RenderOptions::default(),
        );

        assert_eq!(
            ctx.calls,
            vec![
                DrawCall::Save,
                DrawCall::Translate(115.0, 230.0),
                DrawCall::DrawImage {
                    sheet_id: "A".into(),
                    src: CropRect::new(0.0, 0.0, 32.0, 32.0),
                    dest: Rect::new(-15.0, -30.0, 30.0, 30.0),
                    transform: glam::Affine2::from_translation(Vec2::new(115.0, 230.0)),
                    alpha: 1.0,
                },
                DrawCall::Restore,
            ]
        );
        assert_eq!(
            ctx.image_screen_bounds(0),
            Some(Rect::new(100.0, 200.0, 30.0, 30.0))
        );
    }

    #[test]
    fn test_facing_left_mirrors_in_place() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        let opts = RenderOptions::default().facing(Facing::Left);
        renderer.render(&mut ctx, Some(&sprite()), 100.0, 200.0, 30.0, 30.0, &opts);

        assert!(ctx.calls.contains(&DrawCall::Scale(-1.0, 1.0)));
        assert_eq!(
            ctx.image_screen_bounds(0),
            Some(Rect::new(100.0, 200.0, 30.0, 30.0))
        );
        assert_eq!(ctx.transform(), glam::Affine2::IDENTITY);
    }

    #[test]
    fn test_pivot_option_overrides_sprite_pivot() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        let opts = RenderOptions::default().pivot(Vec2::ZERO);
        renderer.render(&mut ctx, Some(&sprite()), 5.0, 6.0, 10.0, 10.0, &opts);
        assert_eq!(ctx.calls[1], DrawCall::Translate(5.0, 6.0));
    }

    #[test]
    fn test_alpha_and_flash() {
        let renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        renderer.render(
            &mut ctx,
            None,
            0.0,
            0.0,
            1.0,
            1.0,
            &RenderOptions::default().alpha(0.3),
        );
        assert!(ctx.calls.contains(&DrawCall::SetGlobalAlpha(0.3)));

        assert_eq!(flash_alpha(100.0), 1.0);
        assert_eq!(flash_alpha(400.0), 0.5);

        ctx.clear();
        let opts = RenderOptions::default().invulnerable(true).at_time(400.0);
        renderer.render(&mut ctx, None, 0.0, 0.0, 1.0, 1.0, &opts);
        assert!(ctx.calls.contains(&DrawCall::SetGlobalAlpha(0.5)));
    }

    #[test]
    fn test_debug_pivot_marker() {
        let mut renderer = SpriteRenderer::new();
        renderer.enable_debug();
        let mut ctx = RecordingContext::new();
        renderer.render(
            &mut ctx,
            Some(&sprite()),
            0.0,
            0.0,
            32.0,
            32.0,
            &RenderOptions::default(),
        );
        assert!(ctx.calls.iter().any(|c| matches!(
            c,
            DrawCall::FillRect { rect, color: Color::MAGENTA, .. } if *rect == Rect::new(-2.0, -2.0, 4.0, 4.0)
        )));
    }

    #[test]
    fn test_debug_overlays_only_in_debug_mode() {
        let mut renderer = SpriteRenderer::new();
        let mut ctx = RecordingContext::new();
        renderer.render_debug_box(&mut ctx, 0.0, 0.0, 10.0, 10.0, Color::GREEN);
        renderer.render_debug_text(&mut ctx, "hi", 0.0, 0.0);
        assert!(ctx.calls.is_empty());

        renderer.enable_debug();
        renderer.render_debug_box(&mut ctx, 0.0, 0.0, 10.0, 10.0, Color::GREEN);
        renderer.render_debug_text(&mut ctx, "hi", 0.0, 0.0);
        assert_eq!(
            ctx.count(|c| matches!(c, DrawCall::StrokeRect { .. })),
            1
        );
        assert!(ctx.calls.iter().any(|c| matches!(
            c,
            DrawCall::FillRect { rect, .. } if *rect == Rect::new(4.0, 4.0, 2.0, 2.0)
        )));
        assert_eq!(ctx.count(|c| matches!(c, DrawCall::Text { .. })), 1);
        renderer.disable_debug();
        assert!(!renderer.is_debug());
    }

    #[test]
    fn test_camera_scaled_rotated_tinted() {
        let renderer = SpriteRenderer::new();
        let opts = RenderOptions::default();
        let s = sprite();

        let mut ctx = RecordingContext::new();
        renderer.render_with_camera(
            &mut ctx,
            Some(&s),
            100.0,
            50.0,
            10.0,
            10.0,
            Vec2::new(40.0, 20.0),
            &opts,
        );
        assert_eq!(
            ctx.image_screen_bounds(0),
            Some(Rect::new(60.0, 30.0, 10.0, 10.0))
        );

        let mut ctx = RecordingContext::new();
        renderer.render_scaled(&mut ctx, Some(&s), 0.0, 0.0, 10.0, 10.0, Vec2::new(2.0, 3.0), &opts);
        assert_eq!(
            ctx.image_screen_bounds(0),
            Some(Rect::new(0.0, 0.0, 20.0, 30.0))
        );

        let mut ctx = RecordingContext::new();
        renderer.render_rotated(&mut ctx, Some(&s), 0.0, 0.0, 10.0, 20.0, 0.0, &opts);
        assert_eq!(ctx.calls[1], DrawCall::Translate(5.0, 10.0));
        assert_eq!(ctx.calls[2], DrawCall::Rotate(0.0));
        assert_eq!(
            ctx.image_screen_bounds(0),
            Some(Rect::new(0.0, 0.0, 10.0, 20.0))
        );
        assert_eq!(ctx.stack_depth(), 0);

        let mut ctx = RecordingContext::new();
        let tint = Color::new(255, 0, 0, 128);
        renderer.render_tinted(&mut ctx, Some(&s), 1.0, 2.0, 3.0, 4.0, tint, &opts);
        assert!(ctx.calls.iter().any(|c| matches!(
            c,
            DrawCall::FillRect { composite: CompositeOp::Multiply, color, rect, .. }
                if *color == tint && *rect == Rect::new(1.0, 2.0, 3.0, 4.0)
        )));
        assert_eq!(ctx.stack_depth(), 0);
    }

    #[test]
    fn test_get_sprite_requires_loaded_sheet_and_mapping() {
        let renderer = SpriteRenderer::new();
        let config = crate::resources::spriteconfig::default_pet_a();
        let mapping = &config.cells[0];
        let empty = SpriteSheet::default();
        assert!(renderer.get_sprite("A", Some(&empty), Some(mapping)).is_none());
        assert!(renderer.get_sprite("A", None, Some(mapping)).is_none());

        let loaded = SpriteSheet {
            image: Some(SheetImage::new(RgbaImage::new(96, 96))),
        };
        assert!(renderer.get_sprite("A", Some(&loaded), None).is_none());
        let sprite = renderer.get_sprite("A", Some(&loaded), Some(mapping)).unwrap();
        assert_eq!(sprite.crop, mapping.crop);
        assert_eq!(sprite.pivot, Some(mapping.pivot));
    }
}
