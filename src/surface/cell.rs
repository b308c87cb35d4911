//! A single glyph cell: appearance, decorators, dirty flag, saved state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::color::Rgba;

bitflags::bitflags! {
    /// Glyph mirroring applied when the cell is drawn.
    #[repr(transparent)]
    #[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Mirror: u8 {
        /// Flip the glyph left-right.
        const HORIZONTAL = 0b01;
        /// Flip the glyph top-bottom.
        const VERTICAL   = 0b10;
    }
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A secondary glyph drawn on top of a cell's main glyph (underline, box
/// edge, selection marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorator {
    /// Glyph index in the font atlas.
    pub glyph: u32,
    /// Draw color.
    pub color: Rgba,
    /// Mirroring for the decorator glyph.
    pub mirror: Mirror,
}

impl Decorator {
    /// Create a new decorator without mirroring.
    pub fn new(glyph: u32, color: Rgba) -> Self {
        Self {
            glyph,
            color,
            mirror: Mirror::empty(),
        }
    }
}

/// Inline storage for the common zero-to-two decorator case.
pub type DecoratorList = SmallVec<[Decorator; 2]>;

/// The appearance snapshot taken when an effect first attaches to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    /// Glyph index at snapshot time.
    pub glyph: u32,
    /// Foreground at snapshot time.
    pub foreground: Rgba,
    /// Background at snapshot time.
    pub background: Rgba,
}

/// A single renderable cell.
///
/// Appearance mutations go through the setters, which compare old and new
/// values and raise the dirty flag only on a visible change. The saved-state
/// snapshot belongs to the effect machinery: it is written once on first
/// attachment and consumed on detach.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    glyph: u32,
    foreground: Rgba,
    background: Rgba,
    decorators: DecoratorList,
    mirror: Mirror,
    dirty: bool,
    saved: Option<CellState>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0, Rgba::WHITE, Rgba::TRANSPARENT)
    }
}

impl Cell {
    /// Create a cell with the given appearance.
    pub fn new(glyph: u32, foreground: Rgba, background: Rgba) -> Self {
        Self {
            glyph,
            foreground,
            background,
            decorators: DecoratorList::new(),
            mirror: Mirror::empty(),
            dirty: false,
            saved: None,
        }
    }

    /// Set foreground color (builder pattern).
    pub fn with_foreground(mut self, color: Rgba) -> Self {
        self.foreground = color;
        self
    }

    /// Set background color (builder pattern).
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Set mirroring (builder pattern).
    pub fn with_mirror(mut self, mirror: Mirror) -> Self {
        self.mirror = mirror;
        self
    }

    /// Glyph index.
    #[inline]
    pub fn glyph(&self) -> u32 {
        self.glyph
    }

    /// Foreground color.
    #[inline]
    pub fn foreground(&self) -> Rgba {
        self.foreground
    }

    /// Background color.
    #[inline]
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Mirror flags.
    #[inline]
    pub fn mirror(&self) -> Mirror {
        self.mirror
    }

    /// Decorators drawn atop the main glyph, in order.
    #[inline]
    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    /// Set the glyph index, marking the cell dirty on change.
    pub fn set_glyph(&mut self, glyph: u32) -> bool {
        let changed = self.glyph != glyph;
        if changed {
            self.glyph = glyph;
            self.dirty = true;
        }
        changed
    }

    /// Set the foreground color, marking the cell dirty on change.
    pub fn set_foreground(&mut self, color: Rgba) -> bool {
        let changed = self.foreground != color;
        if changed {
            self.foreground = color;
            self.dirty = true;
        }
        changed
    }

    /// Set the background color, marking the cell dirty on change.
    pub fn set_background(&mut self, color: Rgba) -> bool {
        let changed = self.background != color;
        if changed {
            self.background = color;
            self.dirty = true;
        }
        changed
    }

    /// Set the mirror flags, marking the cell dirty on change.
    pub fn set_mirror(&mut self, mirror: Mirror) -> bool {
        let changed = self.mirror != mirror;
        if changed {
            self.mirror = mirror;
            self.dirty = true;
        }
        changed
    }

    /// Replace the decorator list. Decorators are copied in; they are not
    /// shared with the caller afterwards.
    pub fn set_decorators(&mut self, decorators: &[Decorator]) -> bool {
        let changed = self.decorators.as_slice() != decorators;
        if changed {
            self.decorators = SmallVec::from_slice(decorators);
            self.dirty = true;
        }
        changed
    }

    /// Append a decorator.
    pub fn push_decorator(&mut self, decorator: Decorator) {
        self.decorators.push(decorator);
        self.dirty = true;
    }

    /// Remove all decorators.
    pub fn clear_decorators(&mut self) {
        if !self.decorators.is_empty() {
            self.decorators.clear();
            self.dirty = true;
        }
    }

    /// Copy glyph, colors, mirror and decorators from another cell.
    pub fn copy_appearance_from(&mut self, other: &Cell) -> bool {
        let mut changed = self.set_glyph(other.glyph);
        changed |= self.set_foreground(other.foreground);
        changed |= self.set_background(other.background);
        changed |= self.set_mirror(other.mirror);
        changed |= self.set_decorators(&other.decorators);
        changed
    }

    /// Current appearance as a snapshot value.
    pub fn state(&self) -> CellState {
        CellState {
            glyph: self.glyph,
            foreground: self.foreground,
            background: self.background,
        }
    }

    /// Snapshot the current appearance if no snapshot exists yet.
    ///
    /// Only the first call takes effect; an effect chain re-attaching to the
    /// same cell must not overwrite the pristine appearance.
    pub fn save_state(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.state());
        }
    }

    /// The saved snapshot, if an effect is holding one.
    #[inline]
    pub fn saved_state(&self) -> Option<CellState> {
        self.saved
    }

    /// Remove and return the saved snapshot without applying it.
    pub fn take_saved(&mut self) -> Option<CellState> {
        self.saved.take()
    }

    /// Install a snapshot directly, used when reloading persisted surfaces.
    pub(crate) fn set_saved(&mut self, saved: Option<CellState>) {
        self.saved = saved;
    }

    /// Restore the saved snapshot into the live appearance and clear it.
    /// Returns true when the visible appearance changed.
    pub fn restore_saved(&mut self) -> bool {
        match self.saved.take() {
            Some(state) => self.apply_state(state),
            None => false,
        }
    }

    /// Write a snapshot into the live appearance.
    pub fn apply_state(&mut self, state: CellState) -> bool {
        let mut changed = self.set_glyph(state.glyph);
        changed |= self.set_foreground(state.foreground);
        changed |= self.set_background(state.background);
        changed
    }

    /// Check if the cell changed since the last render.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the cell as needing a redraw.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
