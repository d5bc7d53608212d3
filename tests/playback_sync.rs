use vidink::overlay::model::{Shape, Stroke, Tool};
use vidink::overlay::sync::{SyncMode, TickOutcome};
use vidink::session::{OverlayEngine, SaveOutcome};
use vidink::settings::EngineSettings;
use std::path::PathBuf;

fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(vidink::storage::SKETCH_STORE_FILE)
}

fn engine(dir: &tempfile::TempDir) -> OverlayEngine {
    OverlayEngine::new(EngineSettings::default(), store_path(dir))
}

fn brush_stroke() -> Stroke {
    // The configured brush defaults are what a host hands the engine.
    Stroke {
        tool: Tool::Brush,
        style: EngineSettings::default().brush(),
        shape: Shape::Line {
            start: (10, 10),
            end: (100, 80),
        },
    }
}

/// Draw something and save it at the engine's current playback time.
fn sketch_at(engine: &mut OverlayEngine, time: f64) -> SaveOutcome {
    engine.time_tick(time);
    engine.begin_edit(None).expect("begin edit");
    engine.add_stroke(brush_stroke()).expect("add stroke");
    engine.save_current_edit().expect("save edit")
}

#[test]
fn saved_sketch_replays_inside_its_window_and_clears_outside() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    assert_eq!(sketch_at(&mut engine, 30.4), SaveOutcome::Saved { anchor: 30 });
    let windows = engine.list_windows("video-a");
    assert_eq!(windows.len(), 1);
    assert_eq!((windows[0].start, windows[0].end), (29, 35));

    // Inside the window the raster is on the surface.
    engine.time_tick(31.0);
    assert_eq!(engine.shown_anchor(), Some(30));
    assert!(!engine.surface().expect("surface").is_blank());
    assert_eq!(engine.mode(), SyncMode::Displaying);

    // Past the window the surface is cleared.
    assert_eq!(engine.time_tick(40.0), TickOutcome::Cleared);
    assert_eq!(engine.shown_anchor(), None);
    assert!(engine.surface().expect("surface").is_blank());
    assert_eq!(engine.mode(), SyncMode::Idle);
}

#[test]
fn ticks_inside_one_window_present_exactly_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);
    sketch_at(&mut engine, 12.4);

    // Re-attach to start from a fresh synchroniser with the index intact.
    engine.attach("other", 640, 360);
    engine.attach("video-a", 640, 360);
    let ticket = engine.begin_load("video-a").expect("load");
    engine.commit_load(ticket);

    assert!(matches!(engine.time_tick(12.1), TickOutcome::Shown(12)));
    assert!(matches!(
        engine.time_tick(12.9),
        TickOutcome::AlreadyShown(12)
    ));
    assert_eq!(engine.sync_stats().presents, 1);
    assert_eq!(engine.sync_stats().redundant_ticks, 1);
}

#[test]
fn seeking_between_windows_swaps_the_presented_sketch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    sketch_at(&mut engine, 10.0);
    engine.time_tick(100.0); // leave the first window before drawing again
    sketch_at(&mut engine, 100.0);

    engine.time_tick(10.5);
    assert_eq!(engine.shown_anchor(), Some(10));
    // Seek straight into the other window, no intermediate ticks.
    engine.time_tick(100.5);
    assert_eq!(engine.shown_anchor(), Some(100));
}

#[test]
fn editing_suspends_playback_updates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);
    sketch_at(&mut engine, 30.0);
    engine.time_tick(50.0);

    engine.begin_edit(None).expect("begin edit");
    assert_eq!(engine.mode(), SyncMode::Editing);
    // The clock keeps running but the surface is left alone.
    assert_eq!(engine.time_tick(31.0), TickOutcome::Suspended);
    assert_eq!(engine.shown_anchor(), None);

    // Cancelling re-evaluates the current time: 31 s is inside the stored
    // window, so the sketch comes straight back.
    let outcome = engine.cancel_edit().expect("cancel edit");
    assert!(matches!(outcome, TickOutcome::Shown(30)));
}

#[test]
fn empty_canvas_save_is_rejected_and_edit_stays_open() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    engine.time_tick(20.0);
    engine.begin_edit(None).expect("begin edit");
    assert_eq!(
        engine.save_current_edit().expect("save"),
        SaveOutcome::EmptyCanvas
    );
    assert_eq!(engine.mode(), SyncMode::Editing);
    assert!(engine.list_windows("video-a").is_empty());

    // The user can still draw and save the same edit.
    engine.add_stroke(brush_stroke()).expect("add stroke");
    assert_eq!(
        engine.save_current_edit().expect("save"),
        SaveOutcome::Saved { anchor: 20 }
    );
}

#[test]
fn overlapping_save_replaces_the_previous_sketch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    sketch_at(&mut engine, 30.0);
    sketch_at(&mut engine, 32.0); // windows [29,35] and [31,37] overlap

    let windows = engine.list_windows("video-a");
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].anchor, 32);
}

#[test]
fn delete_near_removes_only_the_closest_sketch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    sketch_at(&mut engine, 10.0);
    engine.time_tick(50.0);
    sketch_at(&mut engine, 50.0);

    let deleted = engine.delete_near(12.0, 5).expect("delete");
    assert_eq!(deleted, Some(10));

    let anchors: Vec<u32> = engine
        .list_windows("video-a")
        .iter()
        .map(|w| w.anchor)
        .collect();
    assert_eq!(anchors, vec![50]);

    // Nothing within tolerance of 30 s.
    assert_eq!(engine.delete_near(30.0, 5).expect("delete"), None);
}

#[test]
fn deleting_the_shown_sketch_clears_the_surface() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    sketch_at(&mut engine, 30.0);
    engine.time_tick(31.0);
    assert_eq!(engine.shown_anchor(), Some(30));

    engine.delete_near(31.0, 5).expect("delete");
    assert_eq!(engine.shown_anchor(), None);
    assert!(engine.surface().expect("surface").is_blank());
}

#[test]
fn delete_all_wipes_one_video_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);
    sketch_at(&mut engine, 10.0);

    engine.attach("video-b", 640, 360);
    engine.duration_known(300.0);
    sketch_at(&mut engine, 20.0);

    assert_eq!(engine.delete_all_for_video().expect("wipe"), 1);
    assert!(engine.list_windows("video-b").is_empty());
    assert_eq!(engine.list_windows("video-a").len(), 1);
}

#[test]
fn editing_an_existing_sketch_seeds_the_surface() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);
    sketch_at(&mut engine, 30.0);
    engine.time_tick(32.0);

    let anchor = engine.nearest_anchor(32.0).expect("nearest sketch");
    assert_eq!(anchor, 30);
    engine.begin_edit(Some(anchor)).expect("edit existing");
    assert_eq!(engine.mode(), SyncMode::Editing);
    assert!(
        !engine.surface().expect("surface").is_blank(),
        "existing sketch should preload onto the surface"
    );

    // The new window [31,37] overlaps the original [29,35], so the save
    // evicts it: a full replacement, never a merge.
    assert_eq!(
        engine.save_current_edit().expect("save"),
        SaveOutcome::Saved { anchor: 32 }
    );
    let anchors: Vec<u32> = engine
        .list_windows("video-a")
        .iter()
        .map(|w| w.anchor)
        .collect();
    assert_eq!(anchors, vec![32]);
}

#[test]
fn timeline_markers_follow_the_stored_windows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);

    // No duration yet: no markers.
    assert!(engine.timeline_markers().is_empty());

    engine.duration_known(100.0);
    sketch_at(&mut engine, 30.0);

    let markers = engine.timeline_markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].anchor, 30);
    assert!((markers[0].left - 0.29).abs() < 1e-9);
    assert_eq!(markers[0].label, "0:30");
}

#[test]
fn undo_and_redo_rework_the_edit_surface() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);
    engine.attach("video-a", 640, 360);
    engine.duration_known(600.0);

    engine.time_tick(5.0);
    engine.begin_edit(None).expect("begin edit");
    engine.add_stroke(brush_stroke()).expect("add stroke");
    assert!(!engine.surface().expect("surface").is_blank());

    assert!(engine.undo_stroke().expect("undo"));
    assert!(engine.surface().expect("surface").is_blank());
    assert!(!engine.undo_stroke().expect("undo on empty history"));

    assert!(engine.redo_stroke().expect("redo"));
    assert!(!engine.surface().expect("surface").is_blank());
}

#[test]
fn operations_without_an_attached_video_fail_cleanly() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut engine = engine(&dir);

    assert_eq!(engine.time_tick(10.0), TickOutcome::Empty);
    assert!(engine.begin_edit(None).is_err());
    assert!(engine.save_current_edit().is_err());
    assert!(engine.delete_near(10.0, 5).is_err());
    assert_eq!(engine.mode(), SyncMode::Idle);
}
