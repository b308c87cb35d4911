//! Final render step: present the composited output.

use crate::color::Rgba;
use crate::render::{ordering, DrawBackend, RenderContext, RenderStep, ScreenHost};

/// Presents the renderer's output texture at the host's pixel position.
/// Runs last and presents every frame, including clean ones.
#[derive(Debug, Default)]
pub struct OutputRenderStep;

impl OutputRenderStep {
    /// Create the step.
    pub fn new() -> Self {
        Self
    }
}

impl RenderStep for OutputRenderStep {
    fn name(&self) -> &'static str {
        "output"
    }

    fn sort_order(&self) -> u32 {
        ordering::OUTPUT
    }

    fn reset(&mut self, _backend: &mut dyn DrawBackend) {}

    fn refresh(
        &mut self,
        _ctx: &mut RenderContext<'_>,
        _host: &dyn ScreenHost,
        _backing_changed: bool,
        _forced: bool,
    ) -> bool {
        false
    }

    fn compose(&mut self, _ctx: &mut RenderContext<'_>, _host: &dyn ScreenHost) {}

    fn render(&mut self, ctx: &mut RenderContext<'_>, host: &dyn ScreenHost) {
        if let Some(output) = ctx.output {
            ctx.backend
                .present(output, host.absolute_area().position(), Rgba::WHITE);
        }
    }
}
