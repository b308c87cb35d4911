//! Dirty-tracked cell surfaces with a time-based effect engine and a
//! step-composed rendering pipeline.
//!
//! # Overview
//!
//! A [`Surface`] is a grid of glyph cells with per-cell and aggregate dirty
//! tracking plus a clamped scrollable view. An [`EffectsManager`] binds
//! time-driven [`Effect`]s (blink, fade, recolor, compositions) to cells,
//! snapshotting each cell's appearance on first attachment and restoring it
//! on detach. The [`render`] module turns surfaces into backend draw calls
//! through an ordered list of render steps, repainting only what changed.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ Effects  │ -> │ Surface  │ -> │  Render  │ -> │ Backend  │
//! │ (timers) │    │ (cells)  │    │  (steps) │    │ (quads)  │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//! ```
//!
//! # Frame discipline
//!
//! Everything is single-threaded and frame-driven: advance effects with an
//! external `dt`, then render. A frame where nothing changed issues no draw
//! calls.
//!
//! ```rust,ignore
//! use glyphgrid::effects::{Blink, EffectsManager};
//! use glyphgrid::render::{Renderer, ScreenObject, SoftwareBackend};
//! use glyphgrid::Surface;
//!
//! let mut surface = Surface::new(80, 25);
//! let mut effects = EffectsManager::new();
//! effects.set_effect(&mut surface, 0, Some(Blink::new(0.5, -1).into()))?;
//!
//! // per frame:
//! effects.update(&mut surface, dt);
//! renderer.render_frame(&mut backend, &host);
//! ```
//!
//! # Persistence
//!
//! The [`persist`] module snapshots surfaces and effect associations to
//! versioned JSON; effect restoration is tolerant of unknown kinds and
//! stale cell indices.

#![warn(missing_docs)]

pub mod color;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod persist;
pub mod render;
pub mod surface;

pub use color::{Gradient, GradientStop, Rgba};
pub use effects::{Effect, EffectId, EffectKind, EffectsManager};
pub use error::{Error, Result};
pub use geometry::{PixelRect, Point, Size};
pub use surface::{Cell, CellState, Decorator, Mirror, Surface};
