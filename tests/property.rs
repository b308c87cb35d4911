#![allow(clippy::unwrap_used)]
//! Property-based tests: randomized inputs against the structural invariants
//! of surfaces, views, gradients, and the effect manager.

use glyphgrid::effects::{Blink, EffectsManager, Recolor};
use glyphgrid::{Cell, Gradient, Point, Rgba, Size, Surface};
use proptest::prelude::*;

// ============================================================================
// Surface invariants
// ============================================================================

proptest! {
    /// Resize never panics and preserves the overlapping region.
    #[test]
    fn resize_preserves_overlap(
        w1 in 1u16..64,
        h1 in 1u16..64,
        w2 in 1u16..64,
        h2 in 1u16..64,
    ) {
        let mut s = Surface::new(w1, h1);
        for y in 0..h1.min(8) {
            for x in 0..w1.min(8) {
                s.set_glyph(x, y, u32::from(x) * 100 + u32::from(y));
            }
        }

        s.resize(w2, h2);
        prop_assert_eq!(s.width(), w2);
        prop_assert_eq!(s.height(), h2);
        prop_assert_eq!(s.len(), usize::from(w2) * usize::from(h2));

        for y in 0..h1.min(h2).min(8) {
            for x in 0..w1.min(w2).min(8) {
                let cell = s.get(x, y);
                prop_assert!(cell.is_some());
                prop_assert_eq!(
                    cell.unwrap().glyph(),
                    u32::from(x) * 100 + u32::from(y)
                );
            }
        }
    }

    /// Fill never panics and never writes outside the grid, whatever the
    /// requested region.
    #[test]
    fn fill_clamps_to_grid(
        w in 1u16..48,
        h in 1u16..48,
        fx in 0u16..96,
        fy in 0u16..96,
        fw in 0u16..96,
        fh in 0u16..96,
    ) {
        let mut s = Surface::new(w, h);
        s.fill(fx, fy, fw, fh, &Cell::new(35, Rgba::GREEN, Rgba::BLACK));

        for y in 0..h {
            for x in 0..w {
                let cell = s.get(x, y).unwrap();
                let inside = x >= fx
                    && y >= fy
                    && u32::from(x) < u32::from(fx) + u32::from(fw)
                    && u32::from(y) < u32::from(fy) + u32::from(fh);
                prop_assert_eq!(cell.glyph(), if inside { 35 } else { 0 });
            }
        }
    }

    /// The view window always stays fully inside the surface, whatever
    /// position or size is requested.
    #[test]
    fn view_window_stays_in_bounds(
        w in 1u16..64,
        h in 1u16..64,
        vw in 0u16..96,
        vh in 0u16..96,
        px in -200i32..200,
        py in -200i32..200,
    ) {
        let mut s = Surface::new(w, h);
        s.set_view_size(Size::new(vw, vh));
        s.set_view_position(Point::new(px, py));

        let view = s.view_size();
        let pos = s.view_position();
        prop_assert!(view.width <= w);
        prop_assert!(view.height <= h);
        prop_assert!(pos.x >= 0 && pos.y >= 0);
        prop_assert!(pos.x + i32::from(view.width) <= i32::from(w));
        prop_assert!(pos.y + i32::from(view.height) <= i32::from(h));

        // Every view index is a valid cell.
        let len = s.len();
        for index in s.view_indices() {
            prop_assert!(index < len);
        }
    }
}

// ============================================================================
// Gradient invariants
// ============================================================================

proptest! {
    /// Lerp never panics and clamps outside [0, 1].
    #[test]
    fn gradient_lerp_is_total_and_clamped(
        colors in prop::collection::vec(any::<[u8; 4]>(), 1..6),
        t in -2.0f32..3.0,
    ) {
        let stops: Vec<Rgba> = colors
            .iter()
            .map(|&[r, g, b, a]| Rgba::new(r, g, b, a))
            .collect();
        let gradient = Gradient::new(&stops);

        let sampled = gradient.lerp(t);
        if t <= 0.0 {
            prop_assert_eq!(sampled, stops[0]);
        } else if t >= 1.0 {
            prop_assert_eq!(sampled, *stops.last().unwrap());
        }
    }
}

// ============================================================================
// Effect manager invariants
// ============================================================================

proptest! {
    /// After any sequence of attaches and detaches, the cell-to-effect map
    /// and the per-effect cell lists describe the same binding, and no cell
    /// carries two effects.
    #[test]
    fn one_effect_per_cell_under_random_ops(
        ops in prop::collection::vec((0usize..64, 0u8..3), 1..40),
    ) {
        let mut s = Surface::new(8, 8);
        let mut mgr = EffectsManager::new();

        for (cell, op) in ops {
            match op {
                0 => {
                    mgr.set_effect(&mut s, cell, Some(Recolor::foreground(Rgba::RED).into()))
                        .unwrap();
                }
                1 => {
                    mgr.set_effect(&mut s, cell, Some(Blink::new(0.5, -1).into()))
                        .unwrap();
                }
                _ => {
                    mgr.set_effect(&mut s, cell, None).unwrap();
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        let mut bound = 0usize;
        let mut listed = 0usize;
        for cell in 0..s.len() {
            let Some(id) = mgr.effect_id_at(cell) else {
                continue;
            };
            bound += 1;
            let cells = mgr.cells_of(id).unwrap();
            prop_assert!(cells.contains(&cell));
            if seen.insert(id) {
                listed += cells.len();
                for &c in cells {
                    prop_assert_eq!(mgr.effect_id_at(c), Some(id));
                }
            }
        }
        prop_assert_eq!(bound, listed);
    }

    /// A counted blink finishes after exactly `count * 2` toggles.
    #[test]
    fn blink_finishes_after_exact_toggle_count(
        speed in 0.01f64..2.0,
        count in 1i32..10,
    ) {
        let mut s = Surface::new(4, 4);
        let mut mgr = EffectsManager::new();
        mgr.set_effect(&mut s, 0, Some(Blink::new(speed, count).into()))
            .unwrap();

        // A hair over one period per tick; the slack cannot add up to a whole
        // extra period within twenty ticks.
        let tick = speed * 1.001;
        let ticks = count as usize * 2;
        for _ in 0..ticks - 1 {
            mgr.update(&mut s, tick);
        }
        let id = mgr.effect_id_at(0).unwrap();
        prop_assert!(!mgr.effect(id).unwrap().is_finished());

        mgr.update(&mut s, tick);
        prop_assert!(mgr.effect(id).unwrap().is_finished());

        // Finishing lands in the on phase: the cell shows its own colors.
        prop_assert_eq!(s.cell(0).unwrap().foreground(), Rgba::WHITE);
    }
}
