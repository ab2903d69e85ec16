//! Drawing: the [`DrawContext`](context::DrawContext) surface, the sprite
//! pipeline that draws through it and the available backends.

pub mod context;
#[cfg(feature = "raylib")]
pub mod raylib_canvas;
pub mod recorder;
pub mod sprite_renderer;
