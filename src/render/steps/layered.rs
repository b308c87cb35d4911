//! Render step for extra surface layers above the main surface.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::PixelRect;
use crate::render::backend::{BlendMode, TextureId};
use crate::render::font::cell_rect;
use crate::render::host::LayerStack;
use crate::render::steps::{draw_cell, CachedTexture};
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost, StepData};
use crate::surface::Mirror;

/// Composites a [`LayerStack`] into one texture, bottom layer first.
///
/// Layers share the host surface's view window; cells outside a layer's
/// bounds are simply absent. Layer backgrounds blend over lower layers, so
/// the step never paints a default background of its own.
pub struct LayeredRenderStep {
    cache: CachedTexture,
    layers: Option<Rc<RefCell<LayerStack>>>,
}

impl Default for LayeredRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl LayeredRenderStep {
    /// Create the step. It draws nothing until a layer stack is attached
    /// via [`RenderStep::set_data`].
    pub fn new() -> Self {
        Self {
            cache: CachedTexture::new("layered"),
            layers: None,
        }
    }

    /// The cached texture, if a frame has been rendered.
    pub fn texture(&self) -> Option<TextureId> {
        self.cache.id()
    }
}

impl RenderStep for LayeredRenderStep {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn sort_order(&self) -> u32 {
        ordering::LAYERED
    }

    fn set_data(&mut self, data: StepData) -> Result<()> {
        match data {
            StepData::Layers(layers) => {
                self.layers = Some(layers);
                Ok(())
            }
            _ => Err(Error::InvalidStepData {
                step: self.name(),
                expected: "layers",
            }),
        }
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
        let Some(layers) = self.layers.clone() else {
            return false;
        };
        let mut layers = layers.borrow_mut();

        let surface = host.surface().borrow();
        let fs = host.font_size();
        let view = surface.view_size();
        let view_pos = surface.view_position();
        drop(surface);

        let width = view.width as u32 * fs.width as u32;
        let height = view.height as u32 * fs.height as u32;
        if width == 0 || height == 0 {
            return false;
        }

        let reallocated = self.cache.ensure(ctx.backend, width, height);
        if !(reallocated || backing_changed || forced || layers.is_dirty()) {
            return false;
        }
        let Some(texture) = self.cache.id() else {
            return false;
        };

        let font = host.font();
        ctx.backend.begin_target(texture);
        ctx.backend.set_blend(BlendMode::Alpha);
        ctx.backend.clear(Rgba::TRANSPARENT);
        for layer in layers.layers() {
            let layer = layer.borrow();
            for vy in 0..view.height {
                for vx in 0..view.width {
                    let x = view_pos.x as u16 + vx;
                    let y = view_pos.y as u16 + vy;
                    if let Some(cell) = layer.get(x, y) {
                        draw_cell(ctx.backend, font.as_ref(), cell, cell_rect(vx, vy, fs), None);
                    }
                }
            }
        }
        ctx.backend.end_target();

        layers.clear_dirty();
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
