//! Versioned JSON snapshots of surfaces and effect associations.
//!
//! Snapshots are explicit plain-data structs converted to and from runtime
//! types at this boundary; nothing in the runtime model serializes itself
//! wholesale. Effect restoration is best-effort: entries that fail to decode
//! or reference cells outside the surface are skipped with a warning, never
//! failing the rest of the load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::effects::{Effect, EffectsManager};
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};
use crate::surface::{Cell, CellState, Decorator, Mirror, Surface};

/// Highest snapshot version this build reads and the version it writes.
pub const SNAPSHOT_VERSION: u32 = 1;

fn check_version(found: u32) -> Result<()> {
    if found > SNAPSHOT_VERSION {
        return Err(Error::UnsupportedVersion {
            found,
            supported: SNAPSHOT_VERSION,
        });
    }
    Ok(())
}

/// Plain-data form of one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Glyph index.
    pub glyph: u32,
    /// Foreground color.
    pub foreground: Rgba,
    /// Background color.
    pub background: Rgba,
    /// Mirror flags.
    #[serde(default)]
    pub mirror: Mirror,
    /// Decorators in draw order.
    #[serde(default)]
    pub decorators: Vec<Decorator>,
    /// Saved pre-effect appearance, if an effect held one at save time.
    #[serde(default)]
    pub saved: Option<CellState>,
}

impl CellSnapshot {
    fn capture(cell: &Cell) -> Self {
        Self {
            glyph: cell.glyph(),
            foreground: cell.foreground(),
            background: cell.background(),
            mirror: cell.mirror(),
            decorators: cell.decorators().to_vec(),
            saved: cell.saved_state(),
        }
    }

    fn restore(&self) -> Cell {
        let mut cell = Cell::new(self.glyph, self.foreground, self.background);
        cell.set_mirror(self.mirror);
        cell.set_decorators(&self.decorators);
        cell.set_saved(self.saved);
        cell.clear_dirty();
        cell
    }
}

/// Full contents of one surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Grid width.
    pub width: u16,
    /// Grid height.
    pub height: u16,
    /// Default background color.
    pub default_background: Rgba,
    /// View scroll position.
    pub view_position: Point,
    /// View size.
    pub view_size: Size,
    /// Cells in row-major order.
    pub cells: Vec<CellSnapshot>,
}

impl SurfaceSnapshot {
    /// Capture a surface.
    pub fn capture(surface: &Surface) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            width: surface.width(),
            height: surface.height(),
            default_background: surface.default_background(),
            view_position: surface.view_position(),
            view_size: surface.view_size(),
            cells: surface.cells().iter().map(CellSnapshot::capture).collect(),
        }
    }

    /// Rebuild the surface. The restored surface starts clean; the first
    /// frame after a load is a full repaint anyway because every step's
    /// texture gets reallocated.
    pub fn restore(&self) -> Result<Surface> {
        check_version(self.version)?;
        let mut surface = Surface::new(self.width, self.height);
        surface.set_default_background(self.default_background);

        let expected = surface.len();
        if self.cells.len() != expected {
            tracing::warn!(
                found = self.cells.len(),
                expected,
                "cell count does not match surface size; restoring the overlap"
            );
        }
        for (index, snapshot) in self.cells.iter().enumerate().take(expected) {
            if let Some(cell) = surface.cell_mut(index) {
                *cell = snapshot.restore();
            }
        }

        surface.set_view_size(self.view_size);
        surface.set_view_position(self.view_position);
        surface.clear_dirty();
        Ok(surface)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a file as JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// One persisted effect with the flat cell indices it was bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRecord {
    /// The effect configuration.
    pub effect: Effect,
    /// Bound cell indices at save time.
    pub cells: Vec<usize>,
}

/// All effect associations of one manager, in registration order.
///
/// Records are stored as raw JSON values so a snapshot written by a newer
/// build with unknown effect kinds still loads; unreadable records are
/// skipped at restore time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Effect records as raw JSON.
    pub effects: Vec<serde_json::Value>,
}

impl EffectsSnapshot {
    /// Capture every active effect and its cell set.
    pub fn capture(manager: &EffectsManager) -> Result<Self> {
        let mut effects = Vec::with_capacity(manager.len());
        for (effect, cells) in manager.entries() {
            let record = EffectRecord {
                effect: effect.clone(),
                cells: cells.to_vec(),
            };
            effects.push(serde_json::to_value(&record)?);
        }
        Ok(Self {
            version: SNAPSHOT_VERSION,
            effects,
        })
    }

    /// Rebuild a manager against the given surface.
    ///
    /// Undecodable records and out-of-range cell indices are dropped with a
    /// warning. Restored effects restart their timers; only configuration
    /// and associations round-trip.
    pub fn restore(&self, surface: &mut Surface) -> Result<EffectsManager> {
        check_version(self.version)?;
        let mut manager = EffectsManager::new();
        for (index, value) in self.effects.iter().enumerate() {
            let record: EffectRecord = match serde_json::from_value(value.clone()) {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(index, %error, "skipping unreadable effect record");
                    continue;
                }
            };
            let len = surface.len();
            let cells: Vec<usize> = record.cells.iter().copied().filter(|&c| c < len).collect();
            if cells.len() != record.cells.len() {
                tracing::warn!(
                    index,
                    dropped = record.cells.len() - cells.len(),
                    "dropping out-of-range cell indices from effect record"
                );
            }
            if cells.is_empty() {
                tracing::warn!(index, "skipping effect record with no valid cells");
                continue;
            }
            let mut effect = record.effect;
            effect.restart();
            manager.set_effect_cells(surface, &cells, effect)?;
        }
        Ok(manager)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to a file as JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    pub fn read_from(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
