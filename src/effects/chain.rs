//! Effect composition: simultaneous and sequential groups.

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::surface::Cell;

/// Runs child effects simultaneously. Finished once every child is finished;
/// an empty group is finished immediately.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Concurrent {
    children: Vec<Effect>,
}

impl Concurrent {
    /// Group the given effects.
    pub fn new(children: Vec<Effect>) -> Self {
        Self { children }
    }

    /// Add an effect to the group (builder pattern).
    pub fn with(mut self, effect: impl Into<Effect>) -> Self {
        self.children.push(effect.into());
        self
    }

    /// The grouped effects.
    pub fn children(&self) -> &[Effect] {
        &self.children
    }

    pub(crate) fn update(&mut self, dt: f64) -> bool {
        for child in &mut self.children {
            child.update(dt);
        }
        self.children.iter().all(Effect::is_finished)
    }

    pub(crate) fn apply(&mut self, cell: &mut Cell) -> bool {
        let mut changed = false;
        for child in &mut self.children {
            changed |= child.apply_to_cell(cell);
        }
        changed
    }

    pub(crate) fn restart(&mut self) {
        for child in &mut self.children {
            child.restart();
        }
    }
}

/// Runs child effects one after another. Each child runs to completion before
/// the next starts on the following tick; leftover time within the finishing
/// tick is not carried over.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chain {
    children: Vec<Effect>,
    #[serde(skip)]
    current: usize,
}

impl Chain {
    /// Chain the given effects in order.
    pub fn new(children: Vec<Effect>) -> Self {
        Self {
            children,
            current: 0,
        }
    }

    /// Append an effect to the chain (builder pattern).
    pub fn then(mut self, effect: impl Into<Effect>) -> Self {
        self.children.push(effect.into());
        self
    }

    /// The chained effects.
    pub fn children(&self) -> &[Effect] {
        &self.children
    }

    /// Index of the child currently driving the cell.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn update(&mut self, dt: f64) -> bool {
        // Advance past a child that finished on a previous tick. Keeping the
        // finished child current until then lets its terminal value reach
        // the cell through apply before the next child takes over.
        if let Some(child) = self.children.get(self.current) {
            if child.is_finished() {
                self.current += 1;
            }
        }
        let Some(child) = self.children.get_mut(self.current) else {
            return true;
        };
        child.update(dt);
        child.is_finished() && self.current + 1 >= self.children.len()
    }

    pub(crate) fn apply(&mut self, cell: &mut Cell) -> bool {
        match self.children.get_mut(self.current) {
            Some(child) => child.apply_to_cell(cell),
            None => false,
        }
    }

    pub(crate) fn restart(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.restart();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::effects::{delay, Recolor};

    #[test]
    fn empty_groups_finish_immediately() {
        let mut group: Effect = Concurrent::default().into();
        group.update(0.01);
        assert!(group.is_finished());

        let mut chain: Effect = Chain::default().into();
        chain.update(0.01);
        assert!(chain.is_finished());
    }

    #[test]
    fn concurrent_finishes_when_all_children_finish() {
        let mut fx: Effect = Concurrent::default().with(delay(1.0)).with(delay(2.0)).into();
        fx.update(1.0);
        assert!(!fx.is_finished());
        fx.update(1.0);
        assert!(fx.is_finished());
    }

    #[test]
    fn concurrent_applies_all_children() {
        let mut cell = Cell::new(65, Rgba::WHITE, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = Concurrent::default()
            .with(Recolor::foreground(Rgba::RED))
            .with(Recolor::background(Rgba::BLUE))
            .into();
        assert!(fx.apply_to_cell(&mut cell));
        assert_eq!(cell.foreground(), Rgba::RED);
        assert_eq!(cell.background(), Rgba::BLUE);
    }

    #[test]
    fn chain_runs_children_sequentially() {
        let mut cell = Cell::new(65, Rgba::WHITE, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = Chain::default()
            .then(delay(1.0))
            .then(Recolor::foreground(Rgba::RED))
            .into();

        fx.update(0.5);
        assert!(!fx.apply_to_cell(&mut cell));
        assert_eq!(cell.foreground(), Rgba::WHITE);

        // Delay elapses; the recolor starts on the next tick.
        fx.update(0.5);
        assert!(!fx.is_finished());

        fx.update(0.01);
        assert!(fx.is_finished());
        assert!(fx.apply_to_cell(&mut cell));
        assert_eq!(cell.foreground(), Rgba::RED);
    }

    #[test]
    fn chain_restart_rewinds_to_first_child() {
        let mut fx: Effect = Chain::default().then(delay(1.0)).then(delay(1.0)).into();
        fx.update(1.0);
        fx.update(1.0);
        assert!(fx.is_finished());

        fx.restart();
        assert!(!fx.is_finished());
        fx.update(1.0);
        assert!(!fx.is_finished());
    }
}
