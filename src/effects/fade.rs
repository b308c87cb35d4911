//! Gradient fade effect with repeat and ping-pong support.

use serde::{Deserialize, Serialize};

use crate::color::{Gradient, Rgba};
use crate::surface::{Cell, CellState};

/// Interpolates a cell's colors along gradients over `fade_duration` seconds.
///
/// The normalized progress value runs `0 → 1`; with `auto_reverse` it then
/// runs back `1 → 0` before finishing, and with `repeat` the cycle loops
/// forever. When `use_cell_foreground`/`use_cell_background` is set, the
/// matching gradient's first stop (last stop with
/// `use_cell_destination_reverse`) is replaced by the cell's original color at
/// apply time, so one fade instance serves cells of different colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    foreground: Gradient,
    background: Gradient,
    fade_duration: f64,
    repeat: bool,
    auto_reverse: bool,
    use_cell_foreground: bool,
    use_cell_background: bool,
    use_cell_destination_reverse: bool,
    fade_foreground: bool,
    fade_background: bool,
    #[serde(skip)]
    calculated: f64,
    #[serde(skip)]
    going_down: bool,
    #[serde(skip)]
    finished: bool,
}

impl Fade {
    /// A fade over `fade_duration` seconds with transparent gradients and
    /// cell-relative endpoints. Select channels with
    /// [`with_foreground`](Self::with_foreground) /
    /// [`with_background`](Self::with_background).
    pub fn new(fade_duration: f64) -> Self {
        Self {
            foreground: Gradient::solid(Rgba::TRANSPARENT),
            background: Gradient::solid(Rgba::TRANSPARENT),
            fade_duration,
            repeat: false,
            auto_reverse: false,
            use_cell_foreground: true,
            use_cell_background: true,
            use_cell_destination_reverse: false,
            fade_foreground: false,
            fade_background: false,
            calculated: 0.0,
            going_down: false,
            finished: false,
        }
    }

    /// Fade the foreground along `gradient` (builder pattern). Also clears
    /// `use_cell_foreground` so the gradient is used verbatim.
    pub fn with_foreground(mut self, gradient: Gradient) -> Self {
        self.foreground = gradient;
        self.fade_foreground = true;
        self.use_cell_foreground = false;
        self
    }

    /// Fade the background along `gradient` (builder pattern). Also clears
    /// `use_cell_background` so the gradient is used verbatim.
    pub fn with_background(mut self, gradient: Gradient) -> Self {
        self.background = gradient;
        self.fade_background = true;
        self.use_cell_background = false;
        self
    }

    /// Fade the foreground from the cell's own color to `gradient`'s end
    /// (builder pattern).
    pub fn with_foreground_from_cell(mut self, gradient: Gradient) -> Self {
        self.foreground = gradient;
        self.fade_foreground = true;
        self.use_cell_foreground = true;
        self
    }

    /// Fade the background from the cell's own color to `gradient`'s end
    /// (builder pattern).
    pub fn with_background_from_cell(mut self, gradient: Gradient) -> Self {
        self.background = gradient;
        self.fade_background = true;
        self.use_cell_background = true;
        self
    }

    /// Loop the fade forever (builder pattern).
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Run back down the gradient after reaching the end (builder pattern).
    /// Combined with `repeat` this produces a pulse.
    pub fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// Substitute the cell color at the gradient's last stop instead of its
    /// first (builder pattern).
    pub fn with_cell_destination_reverse(mut self, reverse: bool) -> Self {
        self.use_cell_destination_reverse = reverse;
        self
    }

    /// Current normalized progress in `[0, 1]`.
    pub fn calculated_value(&self) -> f64 {
        self.calculated
    }

    /// Advance the progress value. `time_elapsed` is reset at each cycle
    /// boundary so every leg of a reverse or repeat starts from zero.
    pub(crate) fn update(&mut self, time_elapsed: &mut f64) -> bool {
        if self.finished {
            return true;
        }
        if self.fade_duration <= 0.0 {
            self.calculated = 1.0;
            self.finished = !self.repeat;
            return self.finished;
        }
        if *time_elapsed >= self.fade_duration {
            if self.auto_reverse {
                if !self.going_down {
                    self.going_down = true;
                    *time_elapsed = 0.0;
                } else if self.repeat {
                    self.going_down = false;
                    *time_elapsed = 0.0;
                } else {
                    self.calculated = 0.0;
                    self.finished = true;
                    *time_elapsed = 0.0;
                    return true;
                }
            } else if self.repeat {
                *time_elapsed = 0.0;
            } else {
                self.calculated = 1.0;
                self.finished = true;
                *time_elapsed = 0.0;
                return true;
            }
        }
        self.calculated = if self.going_down {
            1.0 - *time_elapsed / self.fade_duration
        } else {
            *time_elapsed / self.fade_duration
        };
        false
    }

    pub(crate) fn apply(&mut self, cell: &mut Cell, original: &CellState) -> bool {
        let mut changed = false;
        if self.fade_foreground {
            if self.use_cell_foreground {
                if self.use_cell_destination_reverse {
                    self.foreground.set_last_color(original.foreground);
                } else {
                    self.foreground.set_first_color(original.foreground);
                }
            }
            changed |= cell.set_foreground(self.foreground.lerp(self.calculated as f32));
        }
        if self.fade_background {
            if self.use_cell_background {
                if self.use_cell_destination_reverse {
                    self.background.set_last_color(original.background);
                } else {
                    self.background.set_first_color(original.background);
                }
            }
            changed |= cell.set_background(self.background.lerp(self.calculated as f32));
        }
        changed
    }

    pub(crate) fn restart(&mut self) {
        self.calculated = 0.0;
        self.going_down = false;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::effects::Effect;

    fn red_to_blue() -> Fade {
        Fade::new(2.0).with_foreground(Gradient::new(&[Rgba::RED, Rgba::BLUE]))
    }

    #[test]
    fn fade_interpolates_linearly() {
        let mut cell = Cell::new(65, Rgba::RED, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = red_to_blue().into();
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::RED);

        fx.update(1.0);
        assert!(!fx.is_finished());
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::RED.lerp(Rgba::BLUE, 0.5));

        fx.update(1.0);
        assert!(fx.is_finished());
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::BLUE);
    }

    #[test]
    fn fade_from_cell_color_starts_at_original() {
        let mut cell = Cell::new(65, Rgba::GREEN, Rgba::BLACK);
        cell.save_state();

        let mut fx: Effect = Fade::new(2.0)
            .with_foreground_from_cell(Gradient::new(&[Rgba::TRANSPARENT, Rgba::BLUE]))
            .into();
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::GREEN);
    }

    #[test]
    fn auto_reverse_returns_to_start_before_finishing() {
        let mut fx: Effect = Fade::new(1.0)
            .with_foreground(Gradient::new(&[Rgba::RED, Rgba::BLUE]))
            .with_auto_reverse(true)
            .into();

        let mut cell = Cell::new(65, Rgba::RED, Rgba::BLACK);
        cell.save_state();

        // Up leg completes; the reverse leg starts at full progress.
        fx.update(1.0);
        assert!(!fx.is_finished());
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::BLUE);

        fx.update(0.5);
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::RED.lerp(Rgba::BLUE, 0.5));

        fx.update(0.5);
        assert!(fx.is_finished());
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::RED);
    }

    #[test]
    fn repeat_never_finishes() {
        let mut fx: Effect = Fade::new(0.5)
            .with_foreground(Gradient::new(&[Rgba::RED, Rgba::BLUE]))
            .with_repeat(true)
            .into();
        for _ in 0..20 {
            fx.update(0.3);
        }
        assert!(!fx.is_finished());
    }

    #[test]
    fn restart_rewinds_progress() {
        let mut fx: Effect = red_to_blue().into();
        fx.update(5.0);
        assert!(fx.is_finished());
        fx.restart();
        assert!(!fx.is_finished());

        let mut cell = Cell::new(65, Rgba::RED, Rgba::BLACK);
        cell.save_state();
        fx.apply_to_cell(&mut cell);
        assert_eq!(cell.foreground(), Rgba::RED);
    }
}
