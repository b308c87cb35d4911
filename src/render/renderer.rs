//! Frame orchestration over an ordered list of render steps.

use crate::color::Rgba;
use crate::render::backend::{BlendMode, TextureId};
use crate::render::{DrawBackend, RenderContext, RenderStep, ScreenHost};

/// Owns the render steps and the shared output texture.
///
/// A frame runs refresh on every step, and only when at least one step
/// reported a change does it re-composite all step textures into the output,
/// bottom to top. The render hooks then run unconditionally so the output
/// step can present the (possibly unchanged) composite.
pub struct Renderer {
    steps: Vec<Box<dyn RenderStep>>,
    output: Option<TextureId>,
    output_size: (u32, u32),
    force_next: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// A renderer with no steps.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            output: None,
            output_size: (0, 0),
            force_next: false,
        }
    }

    /// A renderer with the standard surface and output steps.
    pub fn with_default_steps() -> Self {
        let mut renderer = Self::new();
        renderer.add_step(Box::new(super::steps::SurfaceRenderStep::new()));
        renderer.add_step(Box::new(super::steps::OutputRenderStep::new()));
        renderer
    }

    /// Insert a step, keeping the list sorted by
    /// [`sort_order`](RenderStep::sort_order). Steps with equal order stay in
    /// insertion order.
    pub fn add_step(&mut self, step: Box<dyn RenderStep>) {
        self.steps.push(step);
        self.steps.sort_by_key(|s| s.sort_order());
    }

    /// Remove and return a step by name.
    pub fn remove_step(&mut self, name: &str) -> Option<Box<dyn RenderStep>> {
        let index = self.steps.iter().position(|s| s.name() == name)?;
        Some(self.steps.remove(index))
    }

    /// Look up a step by name.
    pub fn step_mut(&mut self, name: &str) -> Option<&mut Box<dyn RenderStep>> {
        self.steps.iter_mut().find(|s| s.name() == name)
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// The composited output texture, if a sized frame has been rendered.
    pub fn output(&self) -> Option<TextureId> {
        self.output
    }

    /// Request an unconditional repaint on the next frame.
    pub fn force_refresh(&mut self) {
        self.force_next = true;
    }

    /// Run one frame: refresh, composite if anything changed, then the
    /// per-step render hooks.
    pub fn render_frame(&mut self, backend: &mut dyn DrawBackend, host: &dyn ScreenHost) {
        let (width, height) = host.absolute_area().size();
        if width == 0 || height == 0 {
            return;
        }

        let mut backing_changed = false;
        if self.output.is_none() || self.output_size != (width, height) {
            if let Some(old) = self.output.take() {
                backend.release_texture(old);
            }
            self.output = Some(backend.create_texture(width, height));
            self.output_size = (width, height);
            backing_changed = true;
        }

        let forced = std::mem::take(&mut self.force_next);
        let mut ctx = RenderContext {
            backend,
            output: self.output,
        };

        let mut changed = false;
        for step in &mut self.steps {
            changed |= step.refresh(&mut ctx, host, backing_changed, forced);
        }

        if changed {
            if let Some(output) = self.output {
                ctx.backend.begin_target(output);
                ctx.backend.set_blend(BlendMode::Alpha);
                ctx.backend.clear(Rgba::TRANSPARENT);
                for step in &mut self.steps {
                    step.compose(&mut ctx, host);
                }
                ctx.backend.end_target();
            }
        }

        for step in &mut self.steps {
            step.render(&mut ctx, host);
        }
    }

    /// Release every step's resources and the output texture. The next frame
    /// starts from scratch.
    pub fn reset(&mut self, backend: &mut dyn DrawBackend) {
        for step in &mut self.steps {
            step.reset(backend);
        }
        if let Some(output) = self.output.take() {
            backend.release_texture(output);
        }
        self.output_size = (0, 0);
        self.force_next = true;
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if self.output.is_some() {
            tracing::warn!("renderer dropped without reset; output texture leaked");
        }
    }
}
