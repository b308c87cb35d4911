//! Render step for the control host overlay.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::PixelRect;
use crate::render::backend::{BlendMode, TextureId};
use crate::render::font::cell_rect;
use crate::render::host::ControlHost;
use crate::render::steps::{draw_cell, CachedTexture};
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost, StepData};
use crate::surface::Mirror;

/// Renders a [`ControlHost`]'s overlay surface above everything but the
/// final output. The overlay is transparent where no control painted.
pub struct ControlsRenderStep {
    cache: CachedTexture,
    controls: Option<Rc<RefCell<ControlHost>>>,
}

impl Default for ControlsRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlsRenderStep {
    /// Create the step. It draws nothing until a control host is attached
    /// via [`RenderStep::set_data`].
    pub fn new() -> Self {
        Self {
            cache: CachedTexture::new("controls"),
            controls: None,
        }
    }

    /// The cached texture, if a frame has been rendered.
    pub fn texture(&self) -> Option<TextureId> {
        self.cache.id()
    }
}

impl RenderStep for ControlsRenderStep {
    fn name(&self) -> &'static str {
        "controls"
    }

    fn sort_order(&self) -> u32 {
        ordering::CONTROLS
    }

    fn set_data(&mut self, data: StepData) -> Result<()> {
        match data {
            StepData::Controls(controls) => {
                self.controls = Some(controls);
                Ok(())
            }
            _ => Err(Error::InvalidStepData {
                step: self.name(),
                expected: "controls",
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
        let Some(controls) = self.controls.clone() else {
            return false;
        };
        let controls = controls.borrow();
        let mut overlay = controls.surface().borrow_mut();

        let fs = host.font_size();
        let view = overlay.view_size();
        let view_pos = overlay.view_position();
        let width = view.width as u32 * fs.width as u32;
        let height = view.height as u32 * fs.height as u32;
        if width == 0 || height == 0 {
            return false;
        }

        let reallocated = self.cache.ensure(ctx.backend, width, height);
        if !(reallocated || backing_changed || forced || overlay.is_dirty()) {
            return false;
        }
        let Some(texture) = self.cache.id() else {
            return false;
        };

        let font = host.font();
        ctx.backend.begin_target(texture);
        ctx.backend.set_blend(BlendMode::Alpha);
        ctx.backend.clear(Rgba::TRANSPARENT);
        for vy in 0..view.height {
            for vx in 0..view.width {
                let x = view_pos.x as u16 + vx;
                let y = view_pos.y as u16 + vy;
                if let Some(cell) = overlay.get(x, y) {
                    draw_cell(ctx.backend, font.as_ref(), cell, cell_rect(vx, vy, fs), None);
                }
            }
        }
        ctx.backend.end_target();

        overlay.clear_dirty();
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
