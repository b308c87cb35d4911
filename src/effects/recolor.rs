//! Static color override effect.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::surface::Cell;

/// Overrides a cell's foreground and/or background with fixed colors.
///
/// Finishes on the first update after its start delay, which makes it useful
/// with `remove_on_finished` plus `permanent` for one-shot recoloring, or as
/// a terminal state inside a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recolor {
    /// Replacement foreground, if any.
    pub foreground: Option<Rgba>,
    /// Replacement background, if any.
    pub background: Option<Rgba>,
}

impl Recolor {
    /// Override both colors.
    pub fn new(foreground: Rgba, background: Rgba) -> Self {
        Self {
            foreground: Some(foreground),
            background: Some(background),
        }
    }

    /// Override the foreground only.
    pub fn foreground(color: Rgba) -> Self {
        Self {
            foreground: Some(color),
            background: None,
        }
    }

    /// Override the background only.
    pub fn background(color: Rgba) -> Self {
        Self {
            foreground: None,
            background: Some(color),
        }
    }

    pub(crate) fn apply(&self, cell: &mut Cell) -> bool {
        let mut changed = false;
        if let Some(color) = self.foreground {
            changed |= cell.set_foreground(color);
        }
        if let Some(color) = self.background {
            changed |= cell.set_background(color);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;

    #[test]
    fn recolor_sets_only_requested_channels() {
        let mut cell = Cell::new(65, Rgba::WHITE, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = Recolor::background(Rgba::BLUE).into();
        assert!(fx.apply_to_cell(&mut cell));
        assert_eq!(cell.foreground(), Rgba::WHITE);
        assert_eq!(cell.background(), Rgba::BLUE);
    }

    #[test]
    fn recolor_finishes_on_first_update() {
        let mut fx: Effect = Recolor::new(Rgba::RED, Rgba::BLACK).into();
        assert!(!fx.is_finished());
        fx.update(0.001);
        assert!(fx.is_finished());
    }

    #[test]
    fn reapplying_same_colors_reports_no_change() {
        let mut cell = Cell::new(65, Rgba::WHITE, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = Recolor::foreground(Rgba::RED).into();
        assert!(fx.apply_to_cell(&mut cell));
        assert!(!fx.apply_to_cell(&mut cell));
    }
}
