//! The built-in render steps.
//!
//! Every surface-drawing step follows the same per-cell discipline: inside
//! the current view, draw the background quad (skipped when transparent or
//! when it matches the surface default background, which is painted once for
//! the whole texture), then the glyph quad (skipped for glyph 0, transparent
//! foreground, or foreground equal to background), then decorators in order.

mod controls;
mod cursor;
mod dirty_cells;
mod entity;
mod layered;
mod output;
mod surface;

pub use controls::ControlsRenderStep;
pub use cursor::CursorRenderStep;
pub use dirty_cells::DirtyCellsRenderStep;
pub use entity::EntityRenderStep;
pub use layered::LayeredRenderStep;
pub use output::OutputRenderStep;
pub use surface::SurfaceRenderStep;

use crate::color::Rgba;
use crate::geometry::PixelRect;
use crate::render::backend::{DrawBackend, TextureId};
use crate::render::font::GlyphSource;
use crate::surface::{Cell, Mirror};

/// Draw one cell into `dst` on the current target.
///
/// `skip_background` carries the surface default background; a cell whose
/// background equals it contributes no background quad because the default
/// was already painted underneath.
pub(crate) fn draw_cell(
    backend: &mut dyn DrawBackend,
    font: &dyn GlyphSource,
    cell: &Cell,
    dst: PixelRect,
    skip_background: Option<Rgba>,
) {
    let bg = cell.background();
    if !bg.is_transparent() && Some(bg) != skip_background {
        backend.draw_quad(font.texture(), font.solid_rect(), dst, bg, Mirror::empty());
    }
    let fg = cell.foreground();
    if cell.glyph() != 0 && !fg.is_transparent() && fg != bg {
        backend.draw_quad(
            font.texture(),
            font.glyph_rect(cell.glyph()),
            dst,
            fg,
            cell.mirror(),
        );
    }
    for dec in cell.decorators() {
        if !dec.color.is_transparent() {
            backend.draw_quad(
                font.texture(),
                font.glyph_rect(dec.glyph),
                dst,
                dec.color,
                dec.mirror,
            );
        }
    }
}

/// A step's exclusively owned texture, reallocated on size change.
#[derive(Debug)]
pub(crate) struct CachedTexture {
    step: &'static str,
    texture: Option<TextureId>,
    size: (u32, u32),
}

impl CachedTexture {
    pub(crate) fn new(step: &'static str) -> Self {
        Self {
            step,
            texture: None,
            size: (0, 0),
        }
    }

    pub(crate) fn id(&self) -> Option<TextureId> {
        self.texture
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Make sure the texture exists at the given size. Returns true when it
    /// was (re)allocated, which obligates the caller to a full repaint.
    pub(crate) fn ensure(&mut self, backend: &mut dyn DrawBackend, width: u32, height: u32) -> bool {
        if self.texture.is_some() && self.size == (width, height) {
            return false;
        }
        if let Some(id) = self.texture.take() {
            backend.release_texture(id);
        }
        tracing::debug!(step = self.step, width, height, "allocating step texture");
        self.texture = Some(backend.create_texture(width, height));
        self.size = (width, height);
        true
    }

    pub(crate) fn release(&mut self, backend: &mut dyn DrawBackend) {
        if let Some(id) = self.texture.take() {
            backend.release_texture(id);
        }
        self.size = (0, 0);
    }
}

impl Drop for CachedTexture {
    fn drop(&mut self) {
        if self.texture.is_some() {
            tracing::warn!(step = self.step, "step dropped without reset; texture leaked");
        }
    }
}
