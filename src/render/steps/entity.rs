//! Render step for free-floating entities.

use std::cell::RefCell;
use std::rc::Rc;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::{PixelRect, Point, Size};
use crate::render::backend::{BlendMode, TextureId};
use crate::render::font::cell_rect;
use crate::render::host::EntityHost;
use crate::render::steps::{draw_cell, CachedTexture};
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost, StepData};
use crate::surface::Mirror;

/// Draws each visible entity's glyph at its grid position relative to the
/// host surface's view.
///
/// Repaints when the entity host reports dirty or when the view window moved
/// since the last frame; view tracking is kept here because the surface step
/// clears the surface's dirty state before this step runs.
pub struct EntityRenderStep {
    cache: CachedTexture,
    entities: Option<Rc<RefCell<EntityHost>>>,
    last_view: Option<(Point, Size)>,
}

impl Default for EntityRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRenderStep {
    /// Create the step. It draws nothing until an entity host is attached
    /// via [`RenderStep::set_data`].
    pub fn new() -> Self {
        Self {
            cache: CachedTexture::new("entities"),
            entities: None,
            last_view: None,
        }
    }

    /// The cached texture, if a frame has been rendered.
    pub fn texture(&self) -> Option<TextureId> {
        self.cache.id()
    }
}

impl RenderStep for EntityRenderStep {
    fn name(&self) -> &'static str {
        "entities"
    }

    fn sort_order(&self) -> u32 {
        ordering::ENTITIES
    }

    fn set_data(&mut self, data: StepData) -> Result<()> {
        match data {
            StepData::Entities(entities) => {
                self.entities = Some(entities);
                Ok(())
            }
            _ => Err(Error::InvalidStepData {
                step: self.name(),
                expected: "entities",
            }),
        }
    }

    fn reset(&mut self, backend: &mut dyn DrawBackend) {
        self.cache.release(backend);
        self.last_view = None;
    }

    fn refresh(
        &mut self,
        ctx: &mut RenderContext<'_>,
        host: &dyn ScreenHost,
        backing_changed: bool,
        forced: bool,
    ) -> bool {
        let Some(entities) = self.entities.clone() else {
            return false;
        };
        let mut entities = entities.borrow_mut();

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
        let view_moved = self.last_view != Some((view_pos, view));
        if !(reallocated || backing_changed || forced || view_moved || entities.is_dirty()) {
            return false;
        }
        let Some(texture) = self.cache.id() else {
            return false;
        };

        let font = host.font();
        ctx.backend.begin_target(texture);
        ctx.backend.set_blend(BlendMode::Alpha);
        ctx.backend.clear(Rgba::TRANSPARENT);
        for entity in entities.entities() {
            if !entity.visible {
                continue;
            }
            let rel_x = entity.position.x - view_pos.x;
            let rel_y = entity.position.y - view_pos.y;
            if rel_x < 0 || rel_y < 0 || rel_x >= view.width as i32 || rel_y >= view.height as i32 {
                continue;
            }
            draw_cell(
                ctx.backend,
                font.as_ref(),
                &entity.appearance,
                cell_rect(rel_x as u16, rel_y as u16, fs),
                None,
            );
        }
        ctx.backend.end_target();

        entities.clear_dirty();
        self.last_view = Some((view_pos, view));
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
