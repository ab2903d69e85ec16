//! Headless [`DrawContext`] that records every call.
//!
//! Used by tests to assert on exact drawing sequences and by the headless
//! binary to report what a frame would draw. Alongside the raw calls it keeps
//! the canvas state (transform stack, alpha, composite) so each recorded draw
//! also carries where it really lands.

use glam::{Affine2, Vec2};

use super::context::{Color, CompositeOp, DrawContext, Rect};
use crate::resources::spriteconfig::CropRect;
use crate::resources::spritesheets::SheetImage;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    Translate(f32, f32),
    Scale(f32, f32),
    Rotate(f32),
    SetGlobalAlpha(f32),
    SetComposite(CompositeOp),
    DrawImage {
        sheet_id: String,
        src: CropRect,
        dest: Rect,
        transform: Affine2,
        alpha: f32,
    },
    FillRect {
        rect: Rect,
        color: Color,
        transform: Affine2,
        alpha: f32,
        composite: CompositeOp,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Copy)]
struct CanvasState {
    transform: Affine2,
    alpha: f32,
    composite: CompositeOp,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            composite: CompositeOp::SourceOver,
        }
    }
}

/// Recording draw context.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub calls: Vec<DrawCall>,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transform, for checking that save/restore balanced out.
    pub fn transform(&self) -> Affine2 {
        self.state.transform
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Image draws only.
    pub fn images(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::DrawImage { .. }))
    }

    /// Axis-aligned screen-space bounds of the `i`-th image draw.
    pub fn image_screen_bounds(&self, i: usize) -> Option<Rect> {
        let DrawCall::DrawImage {
            dest, transform, ..
        } = self.images().nth(i)?
        else {
            return None;
        };
        let a = transform.transform_point2(Vec2::new(dest.x, dest.y));
        let b = transform.transform_point2(Vec2::new(dest.x + dest.w, dest.y + dest.h));
        let min = a.min(b);
        let max = a.max(b);
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state);
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
        self.calls.push(DrawCall::Translate(x, y));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(sx, sy));
        self.calls.push(DrawCall::Scale(sx, sy));
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(radians);
        self.calls.push(DrawCall::Rotate(radians));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
        self.calls.push(DrawCall::SetGlobalAlpha(alpha));
    }

    fn set_composite(&mut self, op: CompositeOp) {
        self.state.composite = op;
        self.calls.push(DrawCall::SetComposite(op));
    }

    fn draw_image(&mut self, sheet_id: &str, _image: &SheetImage, src: CropRect, dest: Rect) {
        self.calls.push(DrawCall::DrawImage {
            sheet_id: sheet_id.to_string(),
            src,
            dest,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::FillRect {
            rect,
            color,
            transform: self.state.transform,
            alpha: self.state.alpha,
            composite: self.state.composite,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.calls.push(DrawCall::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, _size: f32, color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
