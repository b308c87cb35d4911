//! Blinking effects: foreground color and glyph variants share one clock.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::surface::{Cell, CellState};

fn on_default() -> bool {
    true
}

/// Shared toggle timing. A blink with `count >= 0` finishes after
/// `count * 2` toggles (each full blink is an off and an on); `-1` runs
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct BlinkClock {
    speed: f64,
    count: i32,
    #[serde(skip, default = "on_default")]
    is_on: bool,
    #[serde(skip)]
    toggles: i32,
}

impl BlinkClock {
    fn new(speed: f64, count: i32) -> Self {
        Self {
            speed,
            count,
            is_on: true,
            toggles: 0,
        }
    }

    fn is_finished(&self) -> bool {
        self.count >= 0 && self.toggles >= self.count.saturating_mul(2)
    }

    /// Consume whole blink periods out of the accumulated time, toggling
    /// once per period. Returns true once all toggles are spent.
    fn update(&mut self, time_elapsed: &mut f64) -> bool {
        if self.is_finished() || self.speed <= 0.0 {
            return true;
        }
        while *time_elapsed >= self.speed {
            *time_elapsed -= self.speed;
            self.is_on = !self.is_on;
            self.toggles += 1;
            if self.is_finished() {
                self.is_on = true;
                break;
            }
        }
        self.is_finished()
    }

    fn restart(&mut self) {
        self.is_on = true;
        self.toggles = 0;
    }
}

/// Toggles a cell's foreground between its original color and an "off"
/// color every `blink_speed` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blink {
    clock: BlinkClock,
    blink_out_color: Rgba,
    use_cell_background: bool,
}

impl Blink {
    /// Blink every `blink_speed` seconds, `blink_count` times (`-1` for
    /// infinite). The off phase shows the cell's own background.
    pub fn new(blink_speed: f64, blink_count: i32) -> Self {
        Self {
            clock: BlinkClock::new(blink_speed, blink_count),
            blink_out_color: Rgba::TRANSPARENT,
            use_cell_background: true,
        }
    }

    /// Use a fixed off-phase color instead of the cell background
    /// (builder pattern).
    pub fn with_blink_out_color(mut self, color: Rgba) -> Self {
        self.blink_out_color = color;
        self.use_cell_background = false;
        self
    }

    /// Whether the foreground currently shows its original color.
    pub fn is_on(&self) -> bool {
        self.clock.is_on
    }

    pub(crate) fn update(&mut self, time_elapsed: &mut f64) -> bool {
        self.clock.update(time_elapsed)
    }

    pub(crate) fn apply(&self, cell: &mut Cell, original: &CellState) -> bool {
        let color = if self.clock.is_on {
            original.foreground
        } else if self.use_cell_background {
            original.background
        } else {
            self.blink_out_color
        };
        cell.set_foreground(color)
    }

    pub(crate) fn restart(&mut self) {
        self.clock.restart();
    }
}

/// Toggles a cell's glyph between its original index and an alternate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlinkGlyph {
    clock: BlinkClock,
    alternate_glyph: u32,
}

impl BlinkGlyph {
    /// Swap to `alternate_glyph` every `blink_speed` seconds, `blink_count`
    /// times (`-1` for infinite).
    pub fn new(alternate_glyph: u32, blink_speed: f64, blink_count: i32) -> Self {
        Self {
            clock: BlinkClock::new(blink_speed, blink_count),
            alternate_glyph,
        }
    }

    /// Whether the cell currently shows its original glyph.
    pub fn is_on(&self) -> bool {
        self.clock.is_on
    }

    pub(crate) fn update(&mut self, time_elapsed: &mut f64) -> bool {
        self.clock.update(time_elapsed)
    }

    pub(crate) fn apply(&self, cell: &mut Cell, original: &CellState) -> bool {
        let glyph = if self.clock.is_on {
            original.glyph
        } else {
            self.alternate_glyph
        };
        cell.set_glyph(glyph)
    }

    pub(crate) fn restart(&mut self) {
        self.clock.restart();
    }
}
