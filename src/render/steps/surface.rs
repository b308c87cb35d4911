//! Full-surface render step.

use crate::color::Rgba;
use crate::geometry::PixelRect;
use crate::render::backend::{BlendMode, TextureId};
use crate::render::font::cell_rect;
use crate::render::steps::{draw_cell, CachedTexture};
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost};
use crate::surface::Mirror;

/// Renders the host's surface view into a cached texture, repainting the
/// whole view whenever the surface reports dirty.
pub struct SurfaceRenderStep {
    cache: CachedTexture,
}

impl Default for SurfaceRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceRenderStep {
    /// Create the step.
    pub fn new() -> Self {
        Self {
            cache: CachedTexture::new("surface"),
        }
    }

    /// The cached texture, if a frame has been rendered.
    pub fn texture(&self) -> Option<TextureId> {
        self.cache.id()
    }
}

impl RenderStep for SurfaceRenderStep {
    fn name(&self) -> &'static str {
        "surface"
    }

    fn sort_order(&self) -> u32 {
        ordering::SURFACE
    }

    fn reset(&mut self, backend: &mut dyn DrawBackend) {
        self.cache.release(backend);
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
        let width = view.width as u32 * fs.width as u32;
        let height = view.height as u32 * fs.height as u32;
        if width == 0 || height == 0 {
            return false;
        }

        let reallocated = self.cache.ensure(ctx.backend, width, height);
        if !(reallocated || backing_changed || forced || surface.is_dirty()) {
            return false;
        }
        let Some(texture) = self.cache.id() else {
            return false;
        };

        let font = host.font();
        ctx.backend.begin_target(texture);
        ctx.backend.set_blend(BlendMode::Alpha);
        ctx.backend.clear(Rgba::TRANSPARENT);

        let default_bg = surface.default_background();
        if !default_bg.is_transparent() {
            ctx.backend.draw_quad(
                font.texture(),
                font.solid_rect(),
                PixelRect::new(0, 0, width, height),
                default_bg,
                Mirror::empty(),
            );
        }

        let view_pos = surface.view_position();
        for vy in 0..view.height {
            for vx in 0..view.width {
                let x = view_pos.x as u16 + vx;
                let y = view_pos.y as u16 + vy;
                if let Some(cell) = surface.get(x, y) {
                    draw_cell(
                        ctx.backend,
                        font.as_ref(),
                        cell,
                        cell_rect(vx, vy, fs),
                        Some(default_bg),
                    );
                }
            }
        }
        ctx.backend.end_target();

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
