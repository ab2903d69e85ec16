//! Drawing surface abstraction.
//!
//! [`DrawContext`] is the small canvas-style API the sprite renderer draws
//! through: a save/restore transform stack, global alpha, a composite mode and
//! a handful of primitives. Backends implement it (see
//! [`RecordingContext`](super::recorder::RecordingContext) and the raylib
//! backend behind the `raylib` feature).

use crate::resources::spriteconfig::CropRect;
use crate::resources::spritesheets::SheetImage;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const GREEN: Color = Color::new(0, 255, 0, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha scaled by `alpha` (0..=1).
    pub fn fade(self, alpha: f32) -> Color {
        let a = (self.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
        Color { a, ..self }
    }
}

/// Destination rectangle in the current transform's space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// How new pixels combine with what is already drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositeOp {
    #[default]
    SourceOver,
    Multiply,
}

/// Canvas-style 2D drawing surface.
///
/// Transform, alpha and composite mode are part of the state saved by
/// [`save`](Self::save) and brought back by [`restore`](Self::restore).
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Clockwise rotation in radians.
    fn rotate(&mut self, radians: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_composite(&mut self, op: CompositeOp);
    /// Draw the `src` region of `image` stretched into `dest`.
    fn draw_image(&mut self, sheet_id: &str, image: &SheetImage, src: CropRect, dest: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color);
}
