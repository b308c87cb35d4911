//! 2D cell grid with a scrollable view and dirty tracking.

mod cell;

pub use cell::{Cell, CellState, Decorator, DecoratorList, Mirror};

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::{Point, Size};

/// A width×height grid of [`Cell`]s with a default background, a clamped
/// scrollable view, and an aggregate dirty flag.
///
/// All cell coordinates are `(x, y)` with the flat index `y * width + x`.
/// Mutating through the editor methods keeps both the per-cell and the
/// aggregate dirty flags coherent; callers that take `get_mut` are expected
/// to use the cell setters, which mark the cell, and the surface picks that
/// up through [`Surface::is_dirty`].
#[derive(Debug, Clone)]
pub struct Surface {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    default_background: Rgba,
    view_position: Point,
    view_size: Size,
    dirty: bool,
}

impl Surface {
    /// Create a surface of blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            default_background: Rgba::TRANSPARENT,
            view_position: Point::ORIGIN,
            view_size: Size::new(width, height),
            dirty: false,
        }
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a zero-area surface.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Background painted behind every cell that has no own background.
    #[inline]
    pub fn default_background(&self) -> Rgba {
        self.default_background
    }

    /// Set the default background, marking the surface dirty on change.
    pub fn set_default_background(&mut self, color: Rgba) {
        if self.default_background != color {
            self.default_background = color;
            self.dirty = true;
        }
    }

    /// Check if coordinates are within the grid.
    #[inline]
    pub fn is_valid_cell(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Flat index for coordinates, or `None` when out of bounds.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if self.is_valid_cell(x, y) {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Cell at position.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at position.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index_of(x, y).map(move |i| &mut self.cells[i])
    }

    /// Cell at position for contract-checked paths; out-of-range coordinates
    /// are an error, not a silent skip.
    pub fn cell_at(&self, x: u16, y: u16) -> Result<&Cell> {
        self.get(x, y).ok_or(Error::OutOfRange {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    /// Cell by flat index.
    #[inline]
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell by flat index.
    #[inline]
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    // =========================================================================
    // Editor operations
    // =========================================================================

    /// Set a cell's glyph, marking cell and surface dirty on change.
    pub fn set_glyph(&mut self, x: u16, y: u16, glyph: u32) {
        if let Some(i) = self.index_of(x, y) {
            if self.cells[i].set_glyph(glyph) {
                self.dirty = true;
            }
        }
    }

    /// Set a cell's foreground, marking cell and surface dirty on change.
    pub fn set_foreground(&mut self, x: u16, y: u16, color: Rgba) {
        if let Some(i) = self.index_of(x, y) {
            if self.cells[i].set_foreground(color) {
                self.dirty = true;
            }
        }
    }

    /// Set a cell's background, marking cell and surface dirty on change.
    pub fn set_background(&mut self, x: u16, y: u16, color: Rgba) {
        if let Some(i) = self.index_of(x, y) {
            if self.cells[i].set_background(color) {
                self.dirty = true;
            }
        }
    }

    /// Replace a cell's whole appearance.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: &Cell) {
        if let Some(i) = self.index_of(x, y) {
            if self.cells[i].copy_appearance_from(cell) {
                self.dirty = true;
            }
        }
    }

    /// Fill a rectangular region with one appearance, clamped to the grid.
    pub fn fill(&mut self, x: u16, y: u16, w: u16, h: u16, cell: &Cell) {
        if x >= self.width || y >= self.height || w == 0 || h == 0 {
            return;
        }
        let end_x = x.saturating_add(w).min(self.width);
        let end_y = y.saturating_add(h).min(self.height);
        for cy in y..end_y {
            for cx in x..end_x {
                self.set_cell(cx, cy, cell);
            }
        }
    }

    /// Write consecutive glyphs starting at a position, clipped at the row
    /// end. Glyph values come straight from the iterator; colors are fixed.
    pub fn print<I>(&mut self, x: u16, y: u16, glyphs: I, foreground: Rgba, background: Rgba)
    where
        I: IntoIterator<Item = u32>,
    {
        let mut cx = x;
        for glyph in glyphs {
            if cx >= self.width {
                break;
            }
            let cell = Cell::new(glyph, foreground, background);
            self.set_cell(cx, y, &cell);
            cx += 1;
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Top-left cell of the visible view.
    #[inline]
    pub fn view_position(&self) -> Point {
        self.view_position
    }

    /// Size of the visible view in cells.
    #[inline]
    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// Scroll the view, clamped so it always stays inside the surface.
    pub fn set_view_position(&mut self, position: Point) {
        let max_x = (self.width - self.view_size.width.min(self.width)) as i32;
        let max_y = (self.height - self.view_size.height.min(self.height)) as i32;
        let clamped = Point::new(position.x.clamp(0, max_x), position.y.clamp(0, max_y));
        if clamped != self.view_position {
            self.view_position = clamped;
            self.dirty = true;
        }
    }

    /// Resize the view, clamped to the surface, re-clamping the position.
    pub fn set_view_size(&mut self, size: Size) {
        let clamped = size.min(Size::new(self.width, self.height));
        if clamped != self.view_size {
            self.view_size = clamped;
            self.dirty = true;
        }
        self.set_view_position(self.view_position);
    }

    /// Iterate the flat indices of cells inside the current view, row-major.
    pub fn view_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let vx = self.view_position.x as usize;
        let vy = self.view_position.y as usize;
        let vw = self.view_size.width as usize;
        let w = self.width as usize;
        (0..self.view_size.height as usize)
            .flat_map(move |row| (0..vw).map(move |col| (vy + row) * w + vx + col))
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    /// True when the aggregate flag is raised or any cell is dirty.
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.cells.iter().any(Cell::is_dirty)
    }

    /// Raise or clear the aggregate flag. Clearing also clears every cell's
    /// flag so the next frame starts from a clean slate.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if !dirty {
            for cell in &mut self.cells {
                cell.clear_dirty();
            }
        }
    }

    /// Clear both levels of dirty state.
    pub fn clear_dirty(&mut self) {
        self.set_dirty(false);
    }

    // =========================================================================
    // Resize
    // =========================================================================

    /// Resize the grid, preserving the overlapping region.
    ///
    /// Dirty history is cleared and the view is reset to the origin at full
    /// size; any cached render of this surface must be rebuilt.
    pub fn resize(&mut self, new_width: u16, new_height: u16) {
        if new_width == self.width && new_height == self.height {
            return;
        }

        let new_size = (new_width as usize).saturating_mul(new_height as usize);
        let mut new_cells = vec![Cell::default(); new_size];

        let copy_w = self.width.min(new_width) as usize;
        let copy_h = self.height.min(new_height) as usize;
        let old_w = self.width as usize;
        let new_w = new_width as usize;
        for y in 0..copy_h {
            for x in 0..copy_w {
                new_cells[y * new_w + x] = self.cells[y * old_w + x].clone();
            }
        }

        self.cells = new_cells;
        self.width = new_width;
        self.height = new_height;
        self.view_position = Point::ORIGIN;
        self.view_size = Size::new(new_width, new_height);
        for cell in &mut self.cells {
            cell.clear_dirty();
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_and_bounds() {
        let s = Surface::new(10, 5);
        assert_eq!(s.len(), 50);
        assert!(s.is_valid_cell(9, 4));
        assert!(!s.is_valid_cell(10, 0));
        assert!(s.get(10, 0).is_none());
        assert!(s.cell_at(10, 0).is_err());
    }

    #[test]
    fn index_layout_is_row_major() {
        let s = Surface::new(10, 5);
        assert_eq!(s.index_of(3, 2), Some(23));
        assert_eq!(s.index_of(0, 0), Some(0));
        assert_eq!(s.index_of(9, 4), Some(49));
    }

    #[test]
    fn editor_ops_propagate_dirty() {
        let mut s = Surface::new(10, 5);
        assert!(!s.is_dirty());

        s.set_glyph(2, 2, 65);
        assert!(s.is_dirty());
        assert!(s.get(2, 2).expect("valid").is_dirty());

        s.clear_dirty();
        assert!(!s.is_dirty());

        // No-op write stays clean.
        s.set_glyph(2, 2, 65);
        assert!(!s.is_dirty());
    }

    #[test]
    fn cell_mutation_via_get_mut_is_visible() {
        let mut s = Surface::new(4, 4);
        s.get_mut(1, 1).expect("valid").set_foreground(Rgba::RED);
        // The aggregate flag was not raised directly, but the surface still
        // reports dirty because the cell is flagged.
        assert!(s.is_dirty());
    }

    #[test]
    fn default_background_change_marks_dirty() {
        let mut s = Surface::new(4, 4);
        s.set_default_background(Rgba::BLUE);
        assert!(s.is_dirty());
        s.clear_dirty();
        s.set_default_background(Rgba::BLUE);
        assert!(!s.is_dirty());
    }

    #[test]
    fn view_position_clamps() {
        let mut s = Surface::new(20, 10);
        s.set_view_size(Size::new(5, 5));
        s.set_view_position(Point::new(100, 100));
        assert_eq!(s.view_position(), Point::new(15, 5));
        s.set_view_position(Point::new(-3, -3));
        assert_eq!(s.view_position(), Point::ORIGIN);
    }

    #[test]
    fn view_size_clamps_and_reclamps_position() {
        let mut s = Surface::new(20, 10);
        s.set_view_size(Size::new(5, 5));
        s.set_view_position(Point::new(15, 5));
        s.set_view_size(Size::new(10, 10));
        assert_eq!(s.view_size(), Size::new(10, 10));
        assert_eq!(s.view_position(), Point::new(10, 0));
    }

    #[test]
    fn view_indices_cover_scrolled_window() {
        let mut s = Surface::new(10, 10);
        s.set_view_size(Size::new(2, 2));
        s.set_view_position(Point::new(3, 4));
        let indices: Vec<_> = s.view_indices().collect();
        assert_eq!(indices, vec![43, 44, 53, 54]);
    }

    #[test]
    fn resize_preserves_overlap_and_resets_view() {
        let mut s = Surface::new(10, 10);
        s.set_glyph(2, 3, 77);
        s.set_view_size(Size::new(4, 4));
        s.set_view_position(Point::new(5, 5));

        s.resize(6, 6);
        assert_eq!(s.width(), 6);
        assert_eq!(s.height(), 6);
        assert_eq!(s.get(2, 3).expect("valid").glyph(), 77);
        assert_eq!(s.view_position(), Point::ORIGIN);
        assert_eq!(s.view_size(), Size::new(6, 6));
        assert!(s.is_dirty());
    }

    #[test]
    fn resize_to_same_size_is_noop() {
        let mut s = Surface::new(8, 8);
        s.set_glyph(1, 1, 42);
        s.clear_dirty();
        s.resize(8, 8);
        assert!(!s.is_dirty());
        assert_eq!(s.get(1, 1).expect("valid").glyph(), 42);
    }

    #[test]
    fn fill_clamps_to_bounds() {
        let mut s = Surface::new(10, 10);
        let cell = Cell::new(88, Rgba::WHITE, Rgba::BLACK);
        s.fill(8, 8, 5, 5, &cell);
        for y in 8..10 {
            for x in 8..10 {
                assert_eq!(s.get(x, y).expect("valid").glyph(), 88);
            }
        }
        assert_eq!(s.get(7, 8).expect("valid").glyph(), 0);
    }

    #[test]
    fn print_clips_at_row_end() {
        let mut s = Surface::new(4, 1);
        s.print(2, 0, [65, 66, 67], Rgba::WHITE, Rgba::BLACK);
        assert_eq!(s.get(2, 0).expect("valid").glyph(), 65);
        assert_eq!(s.get(3, 0).expect("valid").glyph(), 66);
    }
}
