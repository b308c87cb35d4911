//! Time-driven cell effects.
//!
//! An [`Effect`] mutates the live appearance of one or more cells as time
//! advances, then reverts cleanly when detached. The shared lifecycle is
//! `NotStarted → ActiveDelay → Active → Finished`: every update accumulates
//! elapsed seconds, the delay phase only watches the threshold, and once the
//! delay has elapsed the variant-specific timing logic runs.
//!
//! Variants are a closed set ([`EffectKind`]); each one is a small value type
//! so cloning an effect yields a fully independent timer, which is what
//! [`Effect::clone_on_apply`] relies on.

mod blink;
mod chain;
mod fade;
mod manager;
mod recolor;

pub use blink::{Blink, BlinkGlyph};
pub use chain::{Chain, Concurrent};
pub use fade::Fade;
pub use manager::{EffectsManager, INITIAL_EFFECT_CAPACITY};
pub use recolor::Recolor;

use serde::{Deserialize, Serialize};

use crate::surface::{Cell, CellState};

/// Stable handle for an effect registered with an [`EffectsManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub(crate) u32);

/// The closed set of effect behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EffectKind {
    /// Toggle the foreground color on and off.
    Blink(Blink),
    /// Toggle the glyph between the original and an alternate.
    BlinkGlyph(BlinkGlyph),
    /// Interpolate colors along a gradient over time.
    Fade(Fade),
    /// Static color override.
    Recolor(Recolor),
    /// No-op that occupies time inside a composition.
    Delay,
    /// Run child effects simultaneously.
    Concurrent(Concurrent),
    /// Run child effects one after another.
    Chain(Chain),
}

/// A self-contained unit of time-driven cell mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(flatten)]
    kind: EffectKind,
    /// Seconds to wait before the variant logic starts running.
    start_delay: f64,
    /// Attachments get a private deep copy instead of sharing this instance.
    clone_on_apply: bool,
    /// Detach each cell automatically once the effect finishes.
    remove_on_finished: bool,
    /// Skip state restoration on detach, leaving the mutated appearance.
    discard_cell_state: bool,
    /// Commit the effect's terminal appearance on detach.
    permanent: bool,
    #[serde(skip)]
    time_elapsed: f64,
    #[serde(skip)]
    delay_elapsed: bool,
    #[serde(skip)]
    finished: bool,
}

impl Effect {
    /// Wrap a variant with default lifecycle flags.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            start_delay: 0.0,
            clone_on_apply: false,
            remove_on_finished: false,
            discard_cell_state: false,
            permanent: false,
            time_elapsed: 0.0,
            delay_elapsed: true,
            finished: false,
        }
    }

    /// Set the start delay in seconds (builder pattern).
    pub fn with_start_delay(mut self, seconds: f64) -> Self {
        self.start_delay = seconds;
        self.delay_elapsed = seconds <= 0.0;
        self
    }

    /// Request a private copy per attachment (builder pattern).
    pub fn with_clone_on_apply(mut self, clone: bool) -> Self {
        self.clone_on_apply = clone;
        self
    }

    /// Detach cells automatically when finished (builder pattern).
    pub fn with_remove_on_finished(mut self, remove: bool) -> Self {
        self.remove_on_finished = remove;
        self
    }

    /// Skip restoring the saved cell state on detach (builder pattern).
    pub fn with_discard_cell_state(mut self, discard: bool) -> Self {
        self.discard_cell_state = discard;
        self
    }

    /// Keep the terminal appearance on detach (builder pattern).
    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }

    /// The wrapped variant.
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Whether the effect has run to natural completion.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seconds the effect waits before becoming active.
    #[inline]
    pub fn start_delay(&self) -> f64 {
        self.start_delay
    }

    /// Whether attachments clone this effect.
    #[inline]
    pub fn clone_on_apply(&self) -> bool {
        self.clone_on_apply
    }

    /// Whether finished cells detach automatically.
    #[inline]
    pub fn remove_on_finished(&self) -> bool {
        self.remove_on_finished
    }

    /// Whether detaching skips state restoration.
    #[inline]
    pub fn discard_cell_state(&self) -> bool {
        self.discard_cell_state
    }

    /// Whether the terminal appearance is committed on detach.
    #[inline]
    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    /// Advance the effect's clock by `dt` seconds.
    ///
    /// During the delay phase only the threshold is checked; the accumulated
    /// time restarts at zero when a positive delay elapses so variant timers
    /// begin from their own origin. Composed children see the same reset:
    /// they receive no time on the tick that spends the delay.
    pub fn update(&mut self, dt: f64) {
        self.time_elapsed += dt;

        let mut dt = dt;
        if !self.delay_elapsed {
            if self.start_delay > 0.0 {
                if self.time_elapsed < self.start_delay {
                    return;
                }
                self.time_elapsed = 0.0;
                dt = 0.0;
            }
            self.delay_elapsed = true;
        }

        let finished = match &mut self.kind {
            EffectKind::Blink(b) => b.update(&mut self.time_elapsed),
            EffectKind::BlinkGlyph(b) => b.update(&mut self.time_elapsed),
            EffectKind::Fade(f) => f.update(&mut self.time_elapsed),
            EffectKind::Recolor(_) | EffectKind::Delay => true,
            EffectKind::Concurrent(c) => c.update(dt),
            EffectKind::Chain(c) => c.update(dt),
        };
        if finished {
            self.finished = true;
        }
    }

    /// Apply the effect's current value to a cell's live appearance.
    ///
    /// Reads the original appearance from the cell's saved snapshot (falling
    /// back to the live appearance when no snapshot exists) and returns true
    /// when a visible change occurred.
    pub fn apply_to_cell(&mut self, cell: &mut Cell) -> bool {
        // Serde skips `delay_elapsed`, so a zero-delay effect straight out of
        // deserialization carries a stale false here. The delay only gates
        // while it is actually positive.
        if !self.delay_elapsed && self.start_delay > 0.0 {
            return false;
        }
        let original = cell.saved_state().unwrap_or_else(|| cell.state());
        self.apply_with_state(cell, &original)
    }

    fn apply_with_state(&mut self, cell: &mut Cell, original: &CellState) -> bool {
        match &mut self.kind {
            EffectKind::Blink(b) => b.apply(cell, original),
            EffectKind::BlinkGlyph(b) => b.apply(cell, original),
            EffectKind::Fade(f) => f.apply(cell, original),
            EffectKind::Recolor(r) => r.apply(cell),
            EffectKind::Delay => false,
            EffectKind::Concurrent(c) => c.apply(cell),
            EffectKind::Chain(c) => c.apply(cell),
        }
    }

    /// Reset shared and variant timing state so the effect runs again.
    pub fn restart(&mut self) {
        self.time_elapsed = 0.0;
        self.delay_elapsed = self.start_delay <= 0.0;
        self.finished = false;
        match &mut self.kind {
            EffectKind::Blink(b) => b.restart(),
            EffectKind::BlinkGlyph(b) => b.restart(),
            EffectKind::Fade(f) => f.restart(),
            EffectKind::Recolor(_) | EffectKind::Delay => {}
            EffectKind::Concurrent(c) => c.restart(),
            EffectKind::Chain(c) => c.restart(),
        }
    }
}

impl From<Blink> for Effect {
    fn from(b: Blink) -> Self {
        Self::new(EffectKind::Blink(b))
    }
}

impl From<BlinkGlyph> for Effect {
    fn from(b: BlinkGlyph) -> Self {
        Self::new(EffectKind::BlinkGlyph(b))
    }
}

impl From<Fade> for Effect {
    fn from(f: Fade) -> Self {
        Self::new(EffectKind::Fade(f))
    }
}

impl From<Recolor> for Effect {
    fn from(r: Recolor) -> Self {
        Self::new(EffectKind::Recolor(r))
    }
}

impl From<Concurrent> for Effect {
    fn from(c: Concurrent) -> Self {
        Self::new(EffectKind::Concurrent(c))
    }
}

impl From<Chain> for Effect {
    fn from(c: Chain) -> Self {
        Self::new(EffectKind::Chain(c))
    }
}

/// A pure time delay, usually composed into a [`Chain`].
pub fn delay(seconds: f64) -> Effect {
    Effect::new(EffectKind::Delay).with_start_delay(seconds)
}
