//! Associates effects with surface cells and drives them over time.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::effects::{Effect, EffectId};
use crate::error::{Error, Result};
use crate::surface::Surface;

/// Initial capacity of the effect arena.
pub const INITIAL_EFFECT_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub(crate) struct EffectEntry {
    pub(crate) effect: Effect,
    /// Flat cell indices bound to this effect, in attachment order.
    pub(crate) cells: Vec<usize>,
}

/// Owns active effects and their cell associations for one surface.
///
/// Effects live in an insertion-ordered arena keyed by [`EffectId`]; a
/// reverse map from flat cell index to id enforces the one-effect-per-cell
/// invariant. The manager holds no reference to the surface it manages; the
/// surface is passed into every operation, and indices are validated against
/// it at the boundary.
#[derive(Debug, Clone)]
pub struct EffectsManager {
    effects: IndexMap<EffectId, EffectEntry>,
    by_cell: FxHashMap<usize, EffectId>,
    next_id: u32,
}

impl Default for EffectsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectsManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            effects: IndexMap::with_capacity(INITIAL_EFFECT_CAPACITY),
            by_cell: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Number of distinct active effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// True when no effects are active.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// The effect bound to a cell, if any.
    pub fn effect_id_at(&self, cell: usize) -> Option<EffectId> {
        self.by_cell.get(&cell).copied()
    }

    /// Look up a registered effect by id.
    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.get(&id).map(|entry| &entry.effect)
    }

    /// Cells bound to an effect, in attachment order.
    pub fn cells_of(&self, id: EffectId) -> Option<&[usize]> {
        self.effects.get(&id).map(|entry| entry.cells.as_slice())
    }

    /// Attach an effect to one cell, detaching whatever was there before.
    /// `None` just detaches. Returns the id of the newly registered effect.
    pub fn set_effect(
        &mut self,
        surface: &mut Surface,
        cell: usize,
        effect: Option<Effect>,
    ) -> Result<Option<EffectId>> {
        self.check_cell(surface, cell)?;
        self.detach_cell(surface, cell);
        match effect {
            Some(effect) => Ok(Some(self.attach(surface, effect, vec![cell]))),
            None => Ok(None),
        }
    }

    /// Attach one shared effect instance to a set of cells.
    ///
    /// All indices are validated before anything is mutated, so a bad index
    /// leaves the manager untouched.
    pub fn set_effect_cells(
        &mut self,
        surface: &mut Surface,
        cells: &[usize],
        effect: Effect,
    ) -> Result<EffectId> {
        for &cell in cells {
            self.check_cell(surface, cell)?;
        }
        for &cell in cells {
            self.detach_cell(surface, cell);
        }
        Ok(self.attach(surface, effect, cells.to_vec()))
    }

    /// Bind a cell to an already-registered effect.
    ///
    /// When the effect has `clone_on_apply` set, a private deep copy with its
    /// own id and timer is registered instead, and that id is returned.
    pub fn bind(&mut self, surface: &mut Surface, cell: usize, id: EffectId) -> Result<EffectId> {
        self.check_cell(surface, cell)?;
        let entry = self.effects.get(&id).ok_or(Error::UnknownEffect(id))?;

        if entry.effect.clone_on_apply() {
            let copy = entry.effect.clone();
            self.detach_cell(surface, cell);
            return Ok(self.attach(surface, copy, vec![cell]));
        }

        if self.by_cell.get(&cell) == Some(&id) {
            return Ok(id);
        }
        self.detach_cell(surface, cell);
        // Detaching never removes `id` itself here: the cell was not bound
        // to it, so its cell set cannot have gone empty through this call.
        if let Some(entry) = self.effects.get_mut(&id) {
            entry.cells.push(cell);
        } else {
            return Err(Error::UnknownEffect(id));
        }
        self.by_cell.insert(cell, id);
        self.snapshot_cell(surface, cell);
        Ok(id)
    }

    /// Detach an effect from every cell it is bound to and drop it.
    pub fn remove(&mut self, surface: &mut Surface, id: EffectId) -> Result<()> {
        let mut entry = self.effects.shift_remove(&id).ok_or(Error::UnknownEffect(id))?;
        for &cell in &entry.cells {
            self.by_cell.remove(&cell);
            Self::release_cell(surface, cell, &mut entry.effect);
        }
        Ok(())
    }

    /// Detach and drop every effect.
    pub fn remove_all(&mut self, surface: &mut Surface) {
        for (_, mut entry) in std::mem::take(&mut self.effects) {
            for &cell in &entry.cells {
                Self::release_cell(surface, cell, &mut entry.effect);
            }
        }
        self.by_cell.clear();
    }

    /// Advance all effects by `dt` seconds and apply them to their cells.
    ///
    /// Each distinct effect is updated exactly once per call regardless of
    /// how many cells share it. Cells whose visible appearance changed are
    /// left dirty. Finished effects with `remove_on_finished` are detached,
    /// restoring cell state per their flags.
    pub fn update(&mut self, surface: &mut Surface, dt: f64) {
        let mut spent: Vec<EffectId> = Vec::new();

        for (&id, entry) in &mut self.effects {
            entry.effect.update(dt);
            for &cell in &entry.cells {
                if let Some(c) = surface.cell_mut(cell) {
                    entry.effect.apply_to_cell(c);
                }
            }
            if entry.effect.is_finished() && entry.effect.remove_on_finished() {
                spent.push(id);
            }
        }

        for id in spent {
            if let Some(mut entry) = self.effects.shift_remove(&id) {
                for &cell in &entry.cells {
                    self.by_cell.remove(&cell);
                    Self::release_cell(surface, cell, &mut entry.effect);
                }
            }
        }
    }

    /// Drop associations whose cell index no longer fits the surface, e.g.
    /// after an external resize. Saved state for surviving cells is kept.
    pub fn drop_invalid_cells(&mut self, surface: &Surface) {
        let len = surface.len();
        self.by_cell.retain(|&cell, _| cell < len);
        self.effects.retain(|_, entry| {
            entry.cells.retain(|&cell| cell < len);
            !entry.cells.is_empty()
        });
    }

    /// Iterate registered effects with their cell sets, in insertion order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&Effect, &[usize])> {
        self.effects
            .values()
            .map(|entry| (&entry.effect, entry.cells.as_slice()))
    }

    fn check_cell(&self, surface: &Surface, cell: usize) -> Result<()> {
        if cell < surface.len() {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                index: cell,
                len: surface.len(),
            })
        }
    }

    fn alloc_id(&mut self) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register an effect for pre-validated, already-detached cells.
    fn attach(&mut self, surface: &mut Surface, effect: Effect, cells: Vec<usize>) -> EffectId {
        let id = self.alloc_id();
        for &cell in &cells {
            self.by_cell.insert(cell, id);
            self.snapshot_cell(surface, cell);
        }
        self.effects.insert(id, EffectEntry { effect, cells });
        id
    }

    fn snapshot_cell(&self, surface: &mut Surface, cell: usize) {
        if let Some(c) = surface.cell_mut(cell) {
            c.save_state();
        }
    }

    fn detach_cell(&mut self, surface: &mut Surface, cell: usize) {
        let Some(id) = self.by_cell.remove(&cell) else {
            return;
        };
        let Some(entry) = self.effects.get_mut(&id) else {
            return;
        };
        entry.cells.retain(|&c| c != cell);
        let empty = entry.cells.is_empty();
        Self::release_cell(surface, cell, &mut entry.effect);
        if empty {
            self.effects.shift_remove(&id);
        }
    }

    /// Resolve a detaching cell's appearance per the effect's flags.
    fn release_cell(surface: &mut Surface, cell: usize, effect: &mut Effect) {
        let Some(c) = surface.cell_mut(cell) else {
            return;
        };
        if effect.is_permanent() {
            effect.apply_to_cell(c);
            let _ = c.take_saved();
        } else if effect.discard_cell_state() {
            let _ = c.take_saved();
        } else {
            c.restore_saved();
        }
    }
}
