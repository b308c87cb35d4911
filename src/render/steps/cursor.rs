//! Render step for the input cursor.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::render::font::cell_rect;
use crate::render::host::Cursor;
use crate::render::steps::draw_cell;
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost, StepData};

/// Draws the cursor glyph directly into the composite, with no texture of
/// its own. A dirty cursor is enough to trigger a re-composite of the frame.
pub struct CursorRenderStep {
    cursor: Option<Rc<RefCell<Cursor>>>,
}

impl Default for CursorRenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorRenderStep {
    /// Create the step. It draws nothing until a cursor is attached via
    /// [`RenderStep::set_data`].
    pub fn new() -> Self {
        Self { cursor: None }
    }
}

impl RenderStep for CursorRenderStep {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn sort_order(&self) -> u32 {
        ordering::CURSOR
    }

    fn set_data(&mut self, data: StepData) -> Result<()> {
        match data {
            StepData::Cursor(cursor) => {
                self.cursor = Some(cursor);
                Ok(())
            }
            _ => Err(Error::InvalidStepData {
                step: self.name(),
                expected: "cursor",
            }),
        }
    }

    fn reset(&mut self, _backend: &mut dyn DrawBackend) {}

    fn refresh(
        &mut self,
        _ctx: &mut RenderContext<'_>,
        _host: &dyn ScreenHost,
        _backing_changed: bool,
        forced: bool,
    ) -> bool {
        let Some(cursor) = &self.cursor else {
            return false;
        };
        let mut cursor = cursor.borrow_mut();
        let dirty = cursor.is_dirty();
        cursor.clear_dirty();
        dirty || forced
    }

    fn compose(&mut self, ctx: &mut RenderContext<'_>, host: &dyn ScreenHost) {
        let Some(cursor) = &self.cursor else {
            return;
        };
        let cursor = cursor.borrow();
        if !cursor.is_visible() {
            return;
        }

        let surface = host.surface().borrow();
        let view = surface.view_size();
        let view_pos = surface.view_position();
        drop(surface);

        let rel_x = cursor.position().x - view_pos.x;
        let rel_y = cursor.position().y - view_pos.y;
        if rel_x < 0 || rel_y < 0 || rel_x >= view.width as i32 || rel_y >= view.height as i32 {
            return;
        }
        let font = host.font();
        draw_cell(
            ctx.backend,
            font.as_ref(),
            cursor.appearance(),
            cell_rect(rel_x as u16, rel_y as u16, host.font_size()),
            None,
        );
    }

    fn render(&mut self, _ctx: &mut RenderContext<'_>, _host: &dyn ScreenHost) {}
}
