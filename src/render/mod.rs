//! Rendering pipeline: Surface → Steps → Composite → Present.
//!
//! The pipeline turns dirty-tracked cell surfaces into backend draw calls
//! with as little repainting as possible. Each frame runs three phases over
//! an ordered list of [`RenderStep`]s:
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌───────────┐    ┌──────────┐
//! │ Surface  │ -> │  Refresh  │ -> │  Compose  │ -> │ Present  │
//! │ (Cells)  │    │ (per-step │    │ (ordered  │    │ (output  │
//! └──────────┘    │ textures) │    │   blit)   │    │ texture) │
//!                 └───────────┘    └───────────┘    └──────────┘
//! ```
//!
//! *Refresh* repaints each step's cached texture, but only when that step's
//! inputs changed (or a reallocation forced it). *Compose* runs only when at
//! least one step reported a change; it blits every step texture into the
//! shared output texture in ascending [`sort_order`](RenderStep::sort_order).
//! *Present* hands the composited output to the backend. A frame where
//! nothing changed issues no draw calls at all.
//!
//! Steps draw through the [`DrawBackend`] trait; the in-crate
//! [`SoftwareBackend`] implements it on CPU pixel buffers and is what the
//! integration tests run against.

pub mod backend;
pub mod font;
pub mod host;
mod renderer;
pub mod steps;

pub use backend::{BlendMode, DrawBackend, SoftwareBackend, TextureId};
pub use font::{GlyphSource, GridFont};
pub use host::{
    ControlHost, Cursor, Entity, EntityHost, LayerStack, ScreenHost, ScreenObject, SharedSurface,
};
pub use renderer::Renderer;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Composite ordering constants. Steps execute in ascending order; ties keep
/// insertion order.
pub mod ordering {
    /// Main surface texture.
    pub const SURFACE: u32 = 50;
    /// Dirty-cells-only surface variant, an alternative to [`SURFACE`].
    pub const DIRTY_CELLS: u32 = 50;
    /// Extra surface layers above the main surface.
    pub const LAYERED: u32 = 50;
    /// Free-floating entities.
    pub const ENTITIES: u32 = 60;
    /// Input cursor.
    pub const CURSOR: u32 = 70;
    /// Control host overlay.
    pub const CONTROLS: u32 = 80;
    /// Final present of the composited output.
    pub const OUTPUT: u32 = 90;
}

/// Per-frame handle passed to every step: the backend plus the shared output
/// texture the composite phase targets.
pub struct RenderContext<'a> {
    /// Draw backend for this frame.
    pub backend: &'a mut dyn DrawBackend,
    /// The renderer's output texture, absent until the first sized frame.
    pub output: Option<TextureId>,
}

/// Collaborator payload delivered to a step via [`RenderStep::set_data`].
///
/// Shared `Rc<RefCell<_>>` handles let the owning screen object keep mutating
/// the collaborator between frames.
#[derive(Clone)]
pub enum StepData {
    /// No payload; accepted by steps that need none.
    None,
    /// Layer stack for the layered-surfaces step.
    Layers(Rc<RefCell<LayerStack>>),
    /// Entity collection for the entity step.
    Entities(Rc<RefCell<EntityHost>>),
    /// Cursor for the cursor step.
    Cursor(Rc<RefCell<Cursor>>),
    /// Control overlay for the controls step.
    Controls(Rc<RefCell<ControlHost>>),
}

impl std::fmt::Debug for StepData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepData::None => "none",
            StepData::Layers(_) => "layers",
            StepData::Entities(_) => "entities",
            StepData::Cursor(_) => "cursor",
            StepData::Controls(_) => "controls",
        };
        f.write_str(name)
    }
}

/// One stage of the rendering pipeline.
///
/// A step exclusively owns whatever texture it caches; `reset` releases it
/// and must be idempotent. `refresh` returns true when the step repainted
/// anything, which is what triggers the composite phase for the frame.
pub trait RenderStep {
    /// Stable step name, used for lookup and diagnostics.
    fn name(&self) -> &'static str;

    /// Position in the composite order (see [`ordering`]).
    fn sort_order(&self) -> u32;

    /// Hand the step its collaborator payload. Steps reject payloads of the
    /// wrong kind with [`Error::InvalidStepData`].
    fn set_data(&mut self, data: StepData) -> Result<()> {
        match data {
            StepData::None => Ok(()),
            _ => Err(Error::InvalidStepData {
                step: self.name(),
                expected: "none",
            }),
        }
    }

    /// Release cached resources. Safe to call repeatedly.
    fn reset(&mut self, backend: &mut dyn DrawBackend);

    /// Repaint the step's cached texture if its inputs changed.
    /// `backing_changed` reports that the renderer's output texture was
    /// reallocated this frame; `forced` requests an unconditional repaint.
    fn refresh(
        &mut self,
        ctx: &mut RenderContext<'_>,
        host: &dyn ScreenHost,
        backing_changed: bool,
        forced: bool,
    ) -> bool;

    /// Draw into the output texture. The renderer has already selected the
    /// output as the active target.
    fn compose(&mut self, ctx: &mut RenderContext<'_>, host: &dyn ScreenHost);

    /// Post-composite hook, run every frame. The output step presents here.
    fn render(&mut self, ctx: &mut RenderContext<'_>, host: &dyn ScreenHost);
}
