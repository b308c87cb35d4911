#![allow(clippy::unwrap_used)]
//! Integration tests for the effect engine driving a surface through the
//! public API: attachment, timing, restoration, and composition.

use glyphgrid::effects::{delay, Blink, BlinkGlyph, Chain, Concurrent, EffectsManager, Fade, Recolor};
use glyphgrid::{Cell, Effect, Gradient, Rgba, Surface};

fn surface() -> Surface {
    let mut s = Surface::new(8, 8);
    s.fill(0, 0, 8, 8, &Cell::new(65, Rgba::WHITE, Rgba::BLACK));
    s.clear_dirty();
    s
}

#[test]
fn blink_finishes_at_four_seconds_not_three() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    let fx: Effect = Effect::from(Blink::new(1.0, 2)).with_remove_on_finished(true);
    mgr.set_effect(&mut s, 0, Some(fx)).unwrap();

    for _ in 0..3 {
        mgr.update(&mut s, 1.0);
    }
    assert_eq!(mgr.len(), 1, "still active at 3.0s");

    mgr.update(&mut s, 1.0);
    assert!(mgr.is_empty(), "finished and detached at 4.0s");
    assert_eq!(s.cell(0).unwrap().foreground(), Rgba::WHITE);
}

#[test]
fn fade_reaches_half_blend_at_midpoint() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    s.set_foreground(0, 0, Rgba::RED);
    s.clear_dirty();

    let fade = Fade::new(2.0).with_foreground(Gradient::new(&[Rgba::RED, Rgba::BLUE]));
    mgr.set_effect(&mut s, 0, Some(fade.into())).unwrap();

    mgr.update(&mut s, 1.0);
    assert_eq!(
        s.cell(0).unwrap().foreground(),
        Rgba::RED.lerp(Rgba::BLUE, 0.5)
    );

    mgr.update(&mut s, 1.0);
    assert_eq!(s.cell(0).unwrap().foreground(), Rgba::BLUE);

    // Finished but not removed: the final value stays applied.
    mgr.update(&mut s, 1.0);
    assert_eq!(s.cell(0).unwrap().foreground(), Rgba::BLUE);
}

#[test]
fn replacing_an_effect_restores_before_reattaching() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    mgr.set_effect(&mut s, 9, Some(Recolor::foreground(Rgba::RED).into()))
        .unwrap();
    mgr.update(&mut s, 0.1);
    assert_eq!(s.cell(9).unwrap().foreground(), Rgba::RED);

    // The second attachment must snapshot the pristine white, not the red
    // the first effect painted.
    mgr.set_effect(&mut s, 9, Some(Recolor::foreground(Rgba::GREEN).into()))
        .unwrap();
    mgr.update(&mut s, 0.1);
    assert_eq!(s.cell(9).unwrap().foreground(), Rgba::GREEN);

    mgr.set_effect(&mut s, 9, None).unwrap();
    assert_eq!(s.cell(9).unwrap().foreground(), Rgba::WHITE);
}

#[test]
fn delayed_effect_leaves_cell_alone_until_start() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    let fx: Effect = Effect::from(Recolor::foreground(Rgba::RED)).with_start_delay(1.0);
    mgr.set_effect(&mut s, 3, Some(fx)).unwrap();

    mgr.update(&mut s, 0.5);
    assert_eq!(s.cell(3).unwrap().foreground(), Rgba::WHITE);

    mgr.update(&mut s, 0.6);
    assert_eq!(s.cell(3).unwrap().foreground(), Rgba::RED);
}

#[test]
fn chain_of_delay_then_permanent_recolor() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    let chain = Chain::default()
        .then(delay(1.0))
        .then(Recolor::foreground(Rgba::YELLOW));
    let fx: Effect = Effect::from(chain)
        .with_remove_on_finished(true)
        .with_permanent(true);
    mgr.set_effect(&mut s, 12, Some(fx)).unwrap();

    mgr.update(&mut s, 1.0);
    assert_eq!(s.cell(12).unwrap().foreground(), Rgba::WHITE);

    mgr.update(&mut s, 0.1);
    mgr.update(&mut s, 0.1);
    assert!(mgr.is_empty());
    assert_eq!(s.cell(12).unwrap().foreground(), Rgba::YELLOW);
    assert!(s.cell(12).unwrap().saved_state().is_none());
}

#[test]
fn concurrent_color_and_glyph_blink_share_one_binding() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    let group = Concurrent::default()
        .with(Blink::new(1.0, -1))
        .with(BlinkGlyph::new(42, 1.0, -1));
    mgr.set_effect(&mut s, 20, Some(group.into())).unwrap();
    assert_eq!(mgr.len(), 1);

    mgr.update(&mut s, 1.0);
    let cell = s.cell(20).unwrap();
    assert_eq!(cell.foreground(), Rgba::BLACK);
    assert_eq!(cell.glyph(), 42);

    mgr.update(&mut s, 1.0);
    let cell = s.cell(20).unwrap();
    assert_eq!(cell.foreground(), Rgba::WHITE);
    assert_eq!(cell.glyph(), 65);
}

#[test]
fn shared_effect_detaches_cell_by_cell() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    let id = mgr
        .set_effect_cells(&mut s, &[1, 2, 3], Recolor::foreground(Rgba::RED).into())
        .unwrap();
    mgr.update(&mut s, 0.1);

    mgr.set_effect(&mut s, 2, None).unwrap();
    assert_eq!(s.cell(2).unwrap().foreground(), Rgba::WHITE);
    assert_eq!(s.cell(1).unwrap().foreground(), Rgba::RED);
    assert_eq!(mgr.cells_of(id), Some(&[1usize, 3][..]));

    mgr.set_effect(&mut s, 1, None).unwrap();
    mgr.set_effect(&mut s, 3, None).unwrap();
    assert!(mgr.is_empty(), "effect dropped once its last cell detached");
}

#[test]
fn update_leaves_only_changed_cells_dirty() {
    let mut s = surface();
    let mut mgr = EffectsManager::new();

    mgr.set_effect(&mut s, 5, Some(Blink::new(1.0, -1).into()))
        .unwrap();
    s.clear_dirty();

    // Half a period: no toggle yet, nothing visibly changed.
    mgr.update(&mut s, 0.4);
    assert!(!s.is_dirty());

    mgr.update(&mut s, 0.6);
    assert!(s.is_dirty());
    assert!(s.cell(5).unwrap().is_dirty());
    assert!(!s.cell(6).unwrap().is_dirty());
}
