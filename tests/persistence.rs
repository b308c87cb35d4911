#![allow(clippy::unwrap_used)]
//! Snapshot round-trips through real files, plus the tolerant-restore paths.

use anyhow::Result;
use glyphgrid::effects::{Blink, EffectsManager, Fade, Recolor};
use glyphgrid::persist::{EffectsSnapshot, SurfaceSnapshot, SNAPSHOT_VERSION};
use glyphgrid::{Cell, Decorator, Effect, Error, Gradient, Mirror, Rgba, Surface};

fn surface() -> Surface {
    let mut s = Surface::new(10, 6);
    s.fill(0, 0, 10, 6, &Cell::new(46, Rgba::WHITE, Rgba::BLACK));
    s.set_default_background(Rgba::BLACK);
    s.clear_dirty();
    s
}

#[test]
fn surface_snapshot_file_round_trip() -> Result<()> {
    let mut original = surface();
    original.set_cell(
        3,
        2,
        &Cell::new(64, Rgba::YELLOW, Rgba::BLUE).with_mirror(Mirror::HORIZONTAL),
    );
    if let Some(cell) = original.get_mut(3, 2) {
        cell.push_decorator(Decorator::new(95, Rgba::RED));
        cell.save_state();
        cell.set_foreground(Rgba::GREEN);
    }

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("surface.json");
    SurfaceSnapshot::capture(&original).write_to(&path)?;
    let restored = SurfaceSnapshot::read_from(&path)?.restore()?;

    assert_eq!(restored.width(), 10);
    assert_eq!(restored.height(), 6);
    assert!(!restored.is_dirty());

    let cell = restored.get(3, 2).unwrap();
    assert_eq!(cell.glyph(), 64);
    assert_eq!(cell.foreground(), Rgba::GREEN);
    assert_eq!(cell.mirror(), Mirror::HORIZONTAL);
    assert_eq!(cell.decorators(), &[Decorator::new(95, Rgba::RED)]);
    // The pre-effect snapshot survives so a running effect can still be
    // released cleanly after a reload.
    assert_eq!(cell.saved_state().unwrap().foreground, Rgba::YELLOW);
    Ok(())
}

#[test]
fn effects_snapshot_file_round_trip_preserves_associations() -> Result<()> {
    let mut s = surface();
    let mut mgr = EffectsManager::new();
    mgr.set_effect_cells(&mut s, &[0, 1, 2], Blink::new(0.5, -1).into())?;
    mgr.set_effect(&mut s, 15, Some(Recolor::foreground(Rgba::RED).into()))?;
    let fade = Fade::new(2.0).with_foreground(Gradient::new(&[Rgba::RED, Rgba::BLUE]));
    mgr.set_effect(
        &mut s,
        30,
        Some(Effect::from(fade).with_remove_on_finished(true)),
    )?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("effects.json");
    EffectsSnapshot::capture(&mgr)?.write_to(&path)?;

    let mut target = surface();
    let restored = EffectsSnapshot::read_from(&path)?.restore(&mut target)?;

    assert_eq!(restored.len(), 3);
    let blink_id = restored.effect_id_at(0).unwrap();
    assert_eq!(restored.cells_of(blink_id), Some(&[0usize, 1, 2][..]));
    assert!(restored.effect_id_at(15).is_some());

    let fade_id = restored.effect_id_at(30).unwrap();
    assert!(restored.effect(fade_id).unwrap().remove_on_finished());
    Ok(())
}

#[test]
fn restored_effects_run_from_time_zero() -> Result<()> {
    let mut s = surface();
    let mut mgr = EffectsManager::new();
    let fade = Fade::new(2.0).with_foreground(Gradient::new(&[Rgba::WHITE, Rgba::BLUE]));
    mgr.set_effect(&mut s, 0, Some(fade.into()))?;
    mgr.update(&mut s, 2.0);
    assert_eq!(s.cell(0).unwrap().foreground(), Rgba::BLUE);

    let snapshot = EffectsSnapshot::capture(&mgr)?;
    let mut target = surface();
    let mut restored = snapshot.restore(&mut target)?;

    // Only configuration persists; the timer restarts.
    restored.update(&mut target, 1.0);
    assert_eq!(
        target.cell(0).unwrap().foreground(),
        Rgba::WHITE.lerp(Rgba::BLUE, 0.5)
    );
    Ok(())
}

#[test]
fn malformed_json_is_a_persist_error() {
    let err = SurfaceSnapshot::from_json("{ not json").unwrap_err();
    assert!(matches!(err, Error::Persist(_)));

    let err = EffectsSnapshot::from_json("[]").unwrap_err();
    assert!(matches!(err, Error::Persist(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SurfaceSnapshot::read_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn unknown_effect_kinds_load_as_a_partial_restore() -> Result<()> {
    // A snapshot written by a newer build: one record uses a kind this build
    // has never heard of.
    let json = format!(
        r#"{{
            "version": {SNAPSHOT_VERSION},
            "effects": [
                {{"effect": {{"kind": "Shimmer", "intensity": 0.5}}, "cells": [0, 1]}},
                {{"effect": {{"kind": "Recolor",
                            "foreground": {{"r": 255, "g": 0, "b": 0, "a": 255}},
                            "background": null,
                            "start_delay": 0.0, "clone_on_apply": false,
                            "remove_on_finished": false, "discard_cell_state": false,
                            "permanent": false}}, "cells": [4]}}
            ]
        }}"#
    );
    let snapshot = EffectsSnapshot::from_json(&json)?;
    let mut s = surface();
    let restored = snapshot.restore(&mut s)?;
    assert_eq!(restored.len(), 1);
    assert!(restored.effect_id_at(0).is_none());
    assert!(restored.effect_id_at(4).is_some());
    Ok(())
}

#[test]
fn future_snapshot_versions_are_rejected() -> Result<()> {
    let mut original = surface();
    let mut json = SurfaceSnapshot::capture(&original).to_json()?;
    json = json.replace(
        &format!("\"version\": {SNAPSHOT_VERSION}"),
        &format!("\"version\": {}", SNAPSHOT_VERSION + 1),
    );
    let snapshot = SurfaceSnapshot::from_json(&json)?;
    assert!(matches!(
        snapshot.restore(),
        Err(Error::UnsupportedVersion { found, .. }) if found == SNAPSHOT_VERSION + 1
    ));

    let effects = EffectsSnapshot {
        version: SNAPSHOT_VERSION + 1,
        effects: Vec::new(),
    };
    assert!(matches!(
        effects.restore(&mut original),
        Err(Error::UnsupportedVersion { .. })
    ));
    Ok(())
}

#[test]
fn smaller_surface_drops_stale_cell_indices() -> Result<()> {
    let mut s = surface();
    let mut mgr = EffectsManager::new();
    mgr.set_effect_cells(&mut s, &[0, 55], Blink::new(0.5, -1).into())?;

    let snapshot = EffectsSnapshot::capture(&mgr)?;
    let mut small = Surface::new(4, 4);
    let restored = snapshot.restore(&mut small)?;

    assert_eq!(restored.len(), 1);
    let id = restored.effect_id_at(0).unwrap();
    assert_eq!(restored.cells_of(id), Some(&[0usize][..]));
    Ok(())
}
