//! Partial-redraw surface step: only dirty cells are repainted.

use crate::color::Rgba;
use crate::geometry::{PixelRect, Point, Size};
use crate::render::backend::{BlendMode, TextureId};
use crate::render::font::cell_rect;
use crate::render::steps::{draw_cell, CachedTexture};
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost};
use crate::surface::Mirror;

/// Alternative to [`SurfaceRenderStep`](super::SurfaceRenderStep) that
/// repaints only cells whose dirty flag is set.
///
/// Each repainted cell rect is first erased with [`BlendMode::Replace`] so
/// the texture holds exactly what a full repaint would produce, while pixels
/// of untouched cells are never written at all. Changes that invalidate the
/// whole texture without flagging any cell, a texture reallocation, a view
/// scroll, or a default background change, fall back to a full repaint; the
/// step tracks the last view window and background for that.
pub struct DirtyCellsRenderStep {
    cache: CachedTexture,
    last_view: Option<(Point, Size)>,
    last_background: Option<Rgba>,
}

impl Default for DirtyCellsRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyCellsRenderStep {
    /// Create the step.
    pub fn new() -> Self {
        Self {
            cache: CachedTexture::new("dirty-cells"),
            last_view: None,
            last_background: None,
        }
    }

    /// The cached texture, if a frame has been rendered.
    pub fn texture(&self) -> Option<TextureId> {
        self.cache.id()
    }
}

impl RenderStep for DirtyCellsRenderStep {
    fn name(&self) -> &'static str {
        "dirty-cells"
    }

    fn sort_order(&self) -> u32 {
        ordering::DIRTY_CELLS
    }

    fn reset(&mut self, backend: &mut dyn DrawBackend) {
        self.cache.release(backend);
        self.last_view = None;
        self.last_background = None;
    }

    fn refresh(
        &mut self,
        ctx: &mut RenderContext<'_>,
        host: &dyn ScreenHost,
        backing_changed: bool,
        forced: bool,
    ) -> bool {
        let mut surface = host.surface().borrow_mut();
        let fs = host.font_size();
        let view = surface.view_size();
        let view_pos = surface.view_position();
        let default_bg = surface.default_background();
        let width = view.width as u32 * fs.width as u32;
        let height = view.height as u32 * fs.height as u32;
        if width == 0 || height == 0 {
            return false;
        }

        // Scrolling the view or swapping the default background dirties the
        // whole texture without flagging any individual cell.
        let view_moved = self.last_view != Some((view_pos, view));
        let bg_changed = self.last_background != Some(default_bg);
        let full = self.cache.ensure(ctx.backend, width, height)
            || backing_changed
            || forced
            || view_moved
            || bg_changed;
        if !full && !surface.is_dirty() {
            return false;
        }
        let Some(texture) = self.cache.id() else {
            return false;
        };

        let font = host.font();
        ctx.backend.begin_target(texture);

        if full {
            ctx.backend.set_blend(BlendMode::Alpha);
            ctx.backend.clear(Rgba::TRANSPARENT);
            if !default_bg.is_transparent() {
                ctx.backend.draw_quad(
                    font.texture(),
                    font.solid_rect(),
                    PixelRect::new(0, 0, width, height),
                    default_bg,
                    Mirror::empty(),
                );
            }
        }

        for vy in 0..view.height {
            for vx in 0..view.width {
                let x = view_pos.x as u16 + vx;
                let y = view_pos.y as u16 + vy;
                let Some(cell) = surface.get(x, y) else {
                    continue;
                };
                if !full && !cell.is_dirty() {
                    continue;
                }
                let dst = cell_rect(vx, vy, fs);
                if !full {
                    // Erase back to the default background so the result is
                    // bit-identical to a full repaint of this cell.
                    ctx.backend.set_blend(BlendMode::Replace);
                    ctx.backend.draw_quad(
                        font.texture(),
                        font.solid_rect(),
                        dst,
                        default_bg,
                        Mirror::empty(),
                    );
                    ctx.backend.set_blend(BlendMode::Alpha);
                }
                draw_cell(ctx.backend, font.as_ref(), cell, dst, Some(default_bg));
            }
        }
        ctx.backend.end_target();

        self.last_view = Some((view_pos, view));
        self.last_background = Some(default_bg);
        surface.clear_dirty();
        true
    }

    fn compose(&mut self, ctx: &mut RenderContext<'_>, host: &dyn ScreenHost) {
        let Some(texture) = self.cache.id() else {
            return;
        };
        let (w, h) = self.cache.size();
        ctx.backend.draw_quad(
            texture,
            PixelRect::new(0, 0, w, h),
            PixelRect::new(0, 0, w, h),
            host.tint(),
            Mirror::empty(),
        );
    }

    fn render(&mut self, _ctx: &mut RenderContext<'_>, _host: &dyn ScreenHost) {}
}
