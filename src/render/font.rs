//! Glyph lookup against an externally constructed font atlas.

use crate::geometry::{PixelRect, Size};
use crate::render::backend::TextureId;

/// Maps glyph indices to regions of an atlas texture.
///
/// Atlas construction is out of scope; implementations wrap a texture that
/// already exists in the backend.
pub trait GlyphSource {
    /// The atlas texture.
    fn texture(&self) -> TextureId;

    /// Source rectangle for a glyph index.
    fn glyph_rect(&self, glyph: u32) -> PixelRect;

    /// Source rectangle of a fully solid glyph, used for background fills
    /// and cell erases.
    fn solid_rect(&self) -> PixelRect;

    /// Native pixel size of one glyph cell in the atlas.
    fn glyph_size(&self) -> Size;
}

/// A uniform-grid atlas: glyphs laid out row-major in fixed-size cells.
#[derive(Debug, Clone)]
pub struct GridFont {
    texture: TextureId,
    glyph_width: u32,
    glyph_height: u32,
    columns: u32,
    rows: u32,
    solid_glyph: u32,
}

impl GridFont {
    /// Wrap an atlas texture of `columns x rows` glyph cells, each
    /// `glyph_width x glyph_height` pixels. `solid_glyph` names the index of
    /// a fully opaque glyph.
    pub fn new(
        texture: TextureId,
        glyph_width: u32,
        glyph_height: u32,
        columns: u32,
        rows: u32,
        solid_glyph: u32,
    ) -> Self {
        Self {
            texture,
            glyph_width: glyph_width.max(1),
            glyph_height: glyph_height.max(1),
            columns: columns.max(1),
            rows: rows.max(1),
            solid_glyph,
        }
    }

    /// Number of glyphs in the atlas.
    pub fn glyph_count(&self) -> u32 {
        self.columns * self.rows
    }
}

impl GlyphSource for GridFont {
    fn texture(&self) -> TextureId {
        self.texture
    }

    fn glyph_rect(&self, glyph: u32) -> PixelRect {
        let glyph = glyph % self.glyph_count();
        let col = glyph % self.columns;
        let row = glyph / self.columns;
        PixelRect::new(
            (col * self.glyph_width) as i32,
            (row * self.glyph_height) as i32,
            self.glyph_width,
            self.glyph_height,
        )
    }

    fn solid_rect(&self) -> PixelRect {
        self.glyph_rect(self.solid_glyph)
    }

    fn glyph_size(&self) -> Size {
        Size::new(self.glyph_width as u16, self.glyph_height as u16)
    }
}

/// Destination rectangle of the cell at grid position `(x, y)` when each
/// cell is rendered at `font_size` pixels.
pub fn cell_rect(x: u16, y: u16, font_size: Size) -> PixelRect {
    PixelRect::new(
        x as i32 * font_size.width as i32,
        y as i32 * font_size.height as i32,
        font_size.width as u32,
        font_size.height as u32,
    )
}
