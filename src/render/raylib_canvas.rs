//! raylib backend for [`DrawContext`].
//!
//! raylib has no canvas-style transform stack, so [`RaylibCanvas`] keeps one
//! itself and decomposes the current transform into translation, rotation
//! and scale on every draw. A mirrored transform is drawn by negating the
//! source rectangle, the same trick raylib uses for flipped sprites.
//!
//! Textures must be uploaded before `begin_drawing` borrows the handle, see
//! [`SheetTextures::sync`].

use glam::{Affine2, Vec2};
use log::{debug, warn};
use raylib::ffi;
use raylib::prelude::*;
use rustc_hash::FxHashMap;

use super::context::{Color as RgbaColor, CompositeOp, DrawContext, Rect};
use crate::resources::spriteconfig::CropRect;
use crate::resources::spritesheets::{SheetImage, SpriteSheetManager};

/// GPU copies of the loaded sheets, keyed by sheet id.
#[derive(Default)]
pub struct SheetTextures {
    map: FxHashMap<String, (SheetImage, Texture2D)>,
}

impl SheetTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload sheets that were loaded or replaced since the last call and
    /// drop textures of unloaded sheets.
    pub fn sync(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, sheets: &SpriteSheetManager) {
        let loaded = sheets.get_loaded_sheets();
        self.map.retain(|id, _| loaded.contains(id));

        for id in loaded {
            let Some(image) = sheets.get_sheet_image(&id) else {
                continue;
            };
            if self
                .map
                .get(&id)
                .is_some_and(|(cached, _)| cached.ptr_eq(image))
            {
                continue;
            }
            match upload(rl, thread, image) {
                Some(texture) => {
                    debug!("[raylib] uploaded sheet {} texture", id);
                    self.map.insert(id, (image.clone(), texture));
                }
                None => warn!("[raylib] failed to upload sheet {}", id),
            }
        }
    }

    pub fn get(&self, sheet_id: &str) -> Option<&Texture2D> {
        self.map.get(sheet_id).map(|(_, texture)| texture)
    }
}

fn upload(rl: &mut RaylibHandle, thread: &RaylibThread, image: &SheetImage) -> Option<Texture2D> {
    let pixels = image.pixels();
    let mut rl_image = Image::gen_image_color(
        pixels.width() as i32,
        pixels.height() as i32,
        Color::BLANK,
    );
    for (x, y, px) in pixels.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        rl_image.draw_pixel(x as i32, y as i32, Color::new(r, g, b, a));
    }
    rl.load_texture_from_image(thread, &rl_image).ok()
}

fn rl_color(color: RgbaColor, alpha: f32) -> Color {
    let faded = color.fade(alpha);
    Color::new(faded.r, faded.g, faded.b, faded.a)
}

#[derive(Clone, Copy)]
struct CanvasState {
    transform: Affine2,
    alpha: f32,
    composite: CompositeOp,
}

/// [`DrawContext`] over any raylib draw handle.
pub struct RaylibCanvas<'a, D: RaylibDraw> {
    d: &'a mut D,
    textures: &'a SheetTextures,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl<'a, D: RaylibDraw> RaylibCanvas<'a, D> {
    pub fn new(d: &'a mut D, textures: &'a SheetTextures) -> Self {
        Self {
            d,
            textures,
            state: CanvasState {
                transform: Affine2::IDENTITY,
                alpha: 1.0,
                composite: CompositeOp::SourceOver,
            },
            stack: Vec::new(),
        }
    }

    /// Map a local rect through the current transform.
    ///
    /// Returns the raylib dest rect, its origin, rotation in degrees and
    /// whether each axis is mirrored.
    fn place(&self, rect: Rect) -> (Rectangle, Vector2, f32, bool, bool) {
        let (scale, angle, translation) = self.state.transform.to_scale_angle_translation();
        let a = Vec2::new(rect.x, rect.y) * scale;
        let b = Vec2::new(rect.x + rect.w, rect.y + rect.h) * scale;
        let min = a.min(b);
        let size = (b - a).abs();
        (
            Rectangle::new(translation.x, translation.y, size.x, size.y),
            Vector2::new(-min.x, -min.y),
            angle.to_degrees(),
            scale.x < 0.0,
            scale.y < 0.0,
        )
    }

    fn with_blend(&mut self, draw: impl FnOnce(&mut D)) {
        let multiply = self.state.composite == CompositeOp::Multiply;
        if multiply {
            unsafe { ffi::BeginBlendMode(BlendMode::BLEND_MULTIPLIED as i32) };
        }
        draw(&mut *self.d);
        if multiply {
            unsafe { ffi::EndBlendMode() };
        }
    }
}

impl<D: RaylibDraw> DrawContext for RaylibCanvas<'_, D> {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(sx, sy));
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(radians);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
    }

    fn set_composite(&mut self, op: CompositeOp) {
        self.state.composite = op;
    }

    fn draw_image(&mut self, sheet_id: &str, _image: &SheetImage, src: CropRect, dest: Rect) {
        let textures = self.textures;
        let Some(texture) = textures.get(sheet_id) else {
            return;
        };
        let (dest, origin, rotation, flip_x, flip_y) = self.place(dest);
        let source = Rectangle::new(
            src.x,
            src.y,
            if flip_x { -src.w } else { src.w },
            if flip_y { -src.h } else { src.h },
        );
        let tint = rl_color(RgbaColor::WHITE, self.state.alpha);
        self.with_blend(|d| d.draw_texture_pro(texture, source, dest, origin, rotation, tint));
    }

    fn fill_rect(&mut self, rect: Rect, color: RgbaColor) {
        let (dest, origin, rotation, _, _) = self.place(rect);
        let color = rl_color(color, self.state.alpha);
        self.with_blend(|d| d.draw_rectangle_pro(dest, origin, rotation, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: RgbaColor, line_width: f32) {
        let t = self.state.transform;
        let a = t.transform_point2(Vec2::new(rect.x, rect.y));
        let b = t.transform_point2(Vec2::new(rect.x + rect.w, rect.y + rect.h));
        let min = a.min(b);
        let size = (b - a).abs();
        let color = rl_color(color, self.state.alpha);
        self.d.draw_rectangle_lines_ex(
            Rectangle::new(min.x, min.y, size.x, size.y),
            line_width,
            color,
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: RgbaColor) {
        let p = self.state.transform.transform_point2(Vec2::new(x, y));
        let color = rl_color(color, self.state.alpha);
        self.d
            .draw_text(text, p.x as i32, p.y as i32, size as i32, color);
    }
}
