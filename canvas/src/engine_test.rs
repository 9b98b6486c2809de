#![allow(clippy::float_cmp)]

use rand::Rng;
use serde_json::json;

use super::*;
use crate::consts::{ZOOM_MAX, ZOOM_MIN};

// =============================================================
// Helpers
// =============================================================

const EPOCH: i64 = 1_700_000_000_000;

fn settings() -> EngineSettings {
    EngineSettings { screen: ScreenSize::new(1000.0, 800.0), ..EngineSettings::default() }
}

fn engine() -> EngineCore {
    EngineCore::with_seed(settings(), 7)
}

fn touch_engine() -> EngineCore {
    EngineCore::with_seed(EngineSettings { device: DeviceClass::TouchOnly, ..settings() }, 7)
}

fn now() -> Now {
    Now { instant: Instant::now(), epoch_ms: EPOCH }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn id(raw: &str) -> NoteId {
    NoteId::new(raw)
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Modifiers::default() }
}

/// Notes "a" at screen (100..300, 100..300) and "b" at (500..700, 100..300),
/// given the default centred viewport on a 1000×800 screen.
fn seed(engine: &mut EngineCore, at: Now) {
    let snapshot = json!({
        "a": { "x": 2100, "y": 2200, "createdAt": 1 },
        "b": { "x": 2500, "y": 2200, "createdAt": 2 },
    });
    engine.apply_remote_snapshot(&snapshot, at);
}

fn order(engine: &EngineCore) -> Vec<String> {
    engine.notes().map(|n| n.id.as_str().to_owned()).collect()
}

fn remote_ops(actions: &[Action]) -> Vec<&RemoteOp> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Remote(op) => Some(op),
            _ => None,
        })
        .collect()
}

fn assert_viewport_in_bounds(engine: &EngineCore) {
    let view = engine.viewport();
    let screen = engine.screen();
    assert!((ZOOM_MIN..=ZOOM_MAX).contains(&view.zoom), "zoom {}", view.zoom);
    assert!(view.pan.x <= 0.0 && view.pan.x >= screen.width - CANVAS_SIZE, "pan.x {}", view.pan.x);
    assert!(view.pan.y <= 0.0 && view.pan.y >= screen.height - CANVAS_SIZE, "pan.y {}", view.pan.y);
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_engine_is_idle_and_centered() {
    let engine = EngineCore::default();
    assert_eq!(engine.input(), &InputState::Idle);
    assert_eq!(engine.viewport().zoom, 1.0);
    assert_eq!(engine.viewport().pan, pt(-1860.0, -2100.0));
    assert!(engine.notes().next().is_none());
}

#[test]
fn now_after_advances_both_clocks() {
    let t0 = now();
    let t1 = t0.after(ms(1500));
    assert_eq!(t1.epoch_ms, EPOCH + 1500);
    assert_eq!(t1.instant - t0.instant, ms(1500));
}

// =============================================================
// Collection operations
// =============================================================

#[test]
fn snapshot_orders_by_created_at() {
    let mut engine = engine();
    let snapshot = json!({ "1": { "createdAt": 100 }, "2": { "createdAt": 50 } });
    let actions = engine.apply_remote_snapshot(&snapshot, now());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(order(&engine), vec!["2", "1"]);
}

#[test]
fn create_note_uses_timestamp_id_and_writes_through() {
    let mut engine = engine();
    let (first, actions) = engine.create_note(now());
    assert_eq!(first, id("1700000000000"));
    let ops = remote_ops(&actions);
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], RemoteOp::Write { path, value } if path == "notes/1700000000000" && value["backgroundColor"] == "#87CEEB"));
    assert_eq!(actions.last(), Some(&Action::RenderNeeded));

    let (second, _) = engine.create_note(now());
    assert_eq!(second, id("1700000000001"));
    assert_eq!(order(&engine), vec!["1700000000000", "1700000000001"]);
}

#[test]
fn save_new_note_appends_on_top() {
    let mut engine = engine();
    let snapshot = json!({ "1": { "createdAt": 100 }, "2": { "createdAt": 50 } });
    engine.apply_remote_snapshot(&snapshot, now());
    let mut note = Note::new_local(id("3"), 10, &mut rand::rng());
    note.x = 10.0;
    note.y = 20.0;
    engine.save_note(note, now());
    assert_eq!(order(&engine), vec!["2", "1", "3"]);
    assert_eq!(engine.note(&id("3")).map(|n| n.updated_at), Some(EPOCH));
}

#[test]
fn move_note_raises_and_patches() {
    let mut engine = engine();
    let snapshot = json!({ "1": { "createdAt": 100 }, "2": { "createdAt": 50 }, "3": { "createdAt": 200 } });
    engine.apply_remote_snapshot(&snapshot, now());
    let actions = engine.move_note(&id("2"), 500.0, 500.0, now());
    assert_eq!(order(&engine), vec!["1", "3", "2"]);
    assert_eq!(actions[0], Action::NoteMoved { id: id("2"), x: 500.0, y: 500.0 });
    assert!(matches!(remote_ops(&actions)[..], [RemoteOp::Patch { path, .. }] if path == "notes/2"));
    assert!(engine.move_note(&id("ghost"), 1.0, 1.0, now()).is_empty());
}

#[test]
fn delete_note_twice_is_a_noop_the_second_time() {
    let mut engine = engine();
    seed(&mut engine, now());
    let first = engine.delete_note(&id("a"));
    assert_eq!(first, vec![
        Action::NoteDeleted(id("a")),
        Action::Remote(RemoteOp::Remove { path: "notes/a".into() }),
        Action::RenderNeeded,
    ]);
    assert!(engine.delete_note(&id("a")).is_empty());
    assert_eq!(order(&engine), vec!["b"]);
}

#[test]
fn order_invariant_holds_for_random_edits() {
    let mut engine = engine();
    let mut rng = StdRng::seed_from_u64(99);
    let snapshot = json!({ "n0": {}, "n1": {}, "n2": {}, "n3": {}, "n4": {} });
    engine.apply_remote_snapshot(&snapshot, now());
    for step in 0..200 {
        let target = id(&format!("n{}", rng.random_range(0..5)));
        match step % 3 {
            0 => {
                let note = engine.note(&target).cloned();
                if let Some(note) = note {
                    engine.save_note(note, now());
                }
            }
            1 => {
                engine.move_note(&target, rng.random_range(0.0..4000.0), 0.0, now());
            }
            _ => {
                engine.bring_to_front(&target);
            }
        }
        assert_eq!(engine.notes().last().map(|n| &n.id), Some(&target));
    }
}

// =============================================================
// Wheel / toolbar
// =============================================================

#[test]
fn wheel_zoom_ten_times_compounds() {
    let mut engine = engine();
    let t0 = now();
    for i in 0..10 {
        engine.on_wheel(WheelDelta { dx: 0.0, dy: -1.0 }, ctrl());
        engine.tick(t0.after(ms(16 * i)));
    }
    assert!((engine.viewport().zoom - 1.05_f64.powi(10)).abs() < 1e-9);
    assert_eq!(engine.viewport().zoom_percent(), 163);
}

#[test]
fn wheel_commits_on_tick_with_actions() {
    let mut engine = engine();
    assert!(engine.on_wheel(WheelDelta { dx: 40.0, dy: 20.0 }, Modifiers::default()).is_empty());
    let actions = engine.tick(now());
    assert_eq!(actions, vec![Action::PanChanged(pt(-2020.0, -2110.0)), Action::RenderNeeded]);
}

#[test]
fn toolbar_zoom_and_reset() {
    let mut engine = engine();
    let actions = engine.zoom_in();
    assert!(matches!(actions[0], Action::ZoomChanged(z) if (z - 1.2).abs() < 1e-12));
    engine.on_wheel(WheelDelta { dx: 50.0, dy: 50.0 }, Modifiers::default());
    engine.tick(now());
    let reset = engine.reset_zoom();
    assert_eq!(reset, vec![Action::ZoomChanged(1.0), Action::PanChanged(pt(-2000.0, -2100.0)), Action::RenderNeeded]);
    assert!(engine.reset_zoom().is_empty());
    assert!(matches!(engine.zoom_out()[0], Action::ZoomChanged(z) if (z - 1.0 / 1.2).abs() < 1e-12));
}

#[test]
fn resize_reclamps_pan() {
    let mut engine = engine();
    let actions = engine.set_viewport_size(4800.0, 800.0);
    assert_eq!(actions, vec![Action::PanChanged(pt(-200.0, -2100.0)), Action::RenderNeeded]);
    assert_viewport_in_bounds(&engine);
}

// =============================================================
// Pointer pan
// =============================================================

#[test]
fn background_drag_pans_from_anchor() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_down(pt(900.0, 700.0));
    assert_eq!(engine.input(), &InputState::Panning);
    engine.on_pointer_move(pt(890.0, 690.0));
    engine.on_pointer_move(pt(880.0, 650.0));
    let actions = engine.on_pointer_up(1, now());
    assert_eq!(actions, vec![Action::PanChanged(pt(-2020.0, -2150.0)), Action::RenderNeeded]);
    assert_eq!(engine.input(), &InputState::Idle);
    assert!(engine.tick(now()).is_empty());
}

#[test]
fn random_gestures_keep_viewport_in_bounds() {
    let mut engine = engine();
    let mut rng = StdRng::seed_from_u64(4);
    let t0 = now();
    for step in 0..500 {
        let p = pt(rng.random_range(0.0..1000.0), rng.random_range(0.0..800.0));
        match rng.random_range(0..7) {
            0 => {
                let delta = WheelDelta { dx: rng.random_range(-900.0..900.0), dy: rng.random_range(-900.0..900.0) };
                engine.on_wheel(delta, if rng.random::<bool>() { ctrl() } else { Modifiers::default() });
            }
            1 => {
                engine.on_pointer_down(p);
            }
            2 => {
                engine.on_pointer_move(pt(p.x * 6.0 - 3000.0, p.y * 6.0 - 2400.0));
            }
            3 => {
                engine.on_pointer_up(1, t0);
            }
            4 => {
                engine.on_touch_start(&[p, pt(p.x + 10.0, p.y)]);
            }
            5 => {
                let spread = rng.random_range(0.0..2000.0);
                engine.on_touch_move(&[p, pt(p.x + spread, p.y)]);
            }
            _ => {
                if rng.random::<bool>() {
                    engine.zoom_in();
                } else {
                    engine.zoom_out();
                }
            }
        }
        engine.tick(t0.after(ms(step)));
        assert_viewport_in_bounds(&engine);
    }
}

// =============================================================
// Note drag
// =============================================================

#[test]
fn drag_moves_note_by_pointer_delta() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_down(pt(150.0, 150.0));
    assert_eq!(engine.input(), &InputState::OnNote { id: id("a") });
    assert!(engine.is_dragging());

    engine.on_pointer_move(pt(180.0, 140.0));
    let frame = engine.tick(now());
    assert_eq!(frame[0], Action::NoteMoved { id: id("a"), x: 2130.0, y: 2190.0 });
    assert_eq!(order(&engine), vec!["b", "a"]);

    engine.on_pointer_move(pt(190.0, 160.0));
    engine.on_pointer_move(pt(200.0, 170.0));
    let up = engine.on_pointer_up(1, now());
    assert_eq!(up[0], Action::NoteMoved { id: id("a"), x: 2150.0, y: 2220.0 });
    assert!(matches!(
        remote_ops(&up)[..],
        [RemoteOp::Patch { path, value }] if path == "notes/a" && value["x"] == 2150.0 && value["updatedAt"] == EPOCH
    ));
    assert!(!engine.is_dragging());
}

#[test]
fn drag_offset_is_in_world_units_when_zoomed() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.zoom_in();
    engine.zoom_in();
    let zoom = engine.viewport().zoom;
    let grab = engine.viewport().world_to_screen(pt(2110.0, 2210.0));
    engine.on_pointer_down(grab);
    engine.on_pointer_move(pt(grab.x + 30.0 * zoom, grab.y - 12.0 * zoom));
    engine.on_pointer_up(1, now());
    let a = engine.note(&id("a")).map(|n| (n.x, n.y));
    let (x, y) = a.unwrap_or_default();
    assert!((x - 2130.0).abs() < 1e-9 && (y - 2188.0).abs() < 1e-9);
}

#[test]
fn drag_blocks_viewport_pan() {
    let mut engine = engine();
    seed(&mut engine, now());
    let before = engine.viewport();
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.on_wheel(WheelDelta { dx: 100.0, dy: 100.0 }, Modifiers::default());
    let actions = engine.tick(now());
    assert!(actions.iter().all(|a| !matches!(a, Action::PanChanged(_))));
    assert_eq!(engine.viewport(), before);
}

#[test]
fn drag_is_never_a_click() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.on_pointer_move(pt(151.0, 150.0));
    engine.on_pointer_up(1, now());
    let later = engine.tick(now().after(ms(500)));
    assert!(later.iter().all(|a| !matches!(a, Action::NoteClicked(_))));
}

#[test]
fn pointer_cancel_ends_drag_like_pointer_up() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.on_pointer_move(pt(200.0, 200.0));
    let actions = engine.on_pointer_cancel(now());
    assert_eq!(actions[0], Action::NoteMoved { id: id("a"), x: 2150.0, y: 2250.0 });
    assert!(!engine.is_dragging());

    engine.on_pointer_down(pt(900.0, 700.0));
    assert_eq!(engine.input(), &InputState::Panning);
}

#[test]
fn deleting_dragged_note_ends_drag() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.delete_note(&id("a"));
    assert!(!engine.is_dragging());
    assert_eq!(engine.input(), &InputState::Idle);
    assert!(engine.on_pointer_up(1, now()).is_empty());
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn hover_single_click_raises_after_delay() {
    let mut engine = engine();
    seed(&mut engine, now());
    let t0 = now();
    engine.on_pointer_down(pt(150.0, 150.0));
    assert!(engine.on_pointer_up(1, t0).is_empty());
    assert!(engine.tick(t0.after(ms(199))).is_empty());
    let fired = engine.tick(t0.after(ms(200)));
    assert_eq!(fired, vec![Action::NoteClicked(id("a")), Action::RenderNeeded]);
    assert_eq!(order(&engine), vec!["b", "a"]);
}

#[test]
fn hover_double_click_opens_editor_only() {
    let mut engine = engine();
    seed(&mut engine, now());
    let t0 = now();
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.on_pointer_up(1, t0);
    engine.on_pointer_down(pt(150.0, 150.0));
    let actions = engine.on_pointer_up(2, t0.after(ms(90)));
    let opened = engine.note(&id("a")).cloned().map(Action::OpenEditor);
    assert!(opened.is_some());
    assert_eq!(actions.first(), opened.as_ref());
    assert_eq!(actions.last(), Some(&Action::RenderNeeded));
    assert!(engine.tick(t0.after(ms(1000))).is_empty());
}

#[test]
fn touch_tap_reveals_controls_and_double_tap_opens_viewer() {
    let mut engine = touch_engine();
    seed(&mut engine, now());
    engine.on_touch_start(&[pt(150.0, 150.0)]);
    let tap = engine.on_touch_end(&[], 1, now());
    assert_eq!(tap, vec![Action::ShowControls(id("a"))]);
    assert_eq!(engine.ui().controls_for, Some(id("a")));

    engine.on_touch_start(&[pt(150.0, 150.0)]);
    let double = engine.on_touch_end(&[], 2, now());
    assert_eq!(double[0], Action::HideControls);
    assert!(matches!(&double[1], Action::OpenViewer(n) if n.id == id("a")));
    assert_eq!(engine.ui().controls_for, None);
}

#[test]
fn controls_bypass_click_handling() {
    let mut engine = engine();
    seed(&mut engine, now());
    assert_eq!(engine.on_control(&id("a"), Control::Delete), vec![Action::ConfirmDelete(id("a"))]);
    let edit = engine.on_control(&id("a"), Control::Edit);
    assert!(matches!(&edit[0], Action::OpenEditor(n) if n.id == id("a")));
    assert!(engine.tick(now().after(ms(500))).is_empty());
    assert!(engine.on_control(&id("ghost"), Control::Edit).is_empty());
}

#[test]
fn hover_enter_and_leave_toggle_controls() {
    let mut engine = engine();
    seed(&mut engine, now());
    assert_eq!(engine.on_pointer_enter(&id("b")), vec![Action::ShowControls(id("b"))]);
    assert_eq!(engine.on_pointer_leave(), vec![Action::HideControls]);

    engine.on_pointer_down(pt(150.0, 150.0));
    assert!(engine.on_pointer_enter(&id("b")).is_empty());
}

#[test]
fn snapshot_dropping_revealed_note_hides_controls() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.on_pointer_enter(&id("a"));
    let actions = engine.apply_remote_snapshot(&json!({ "b": {} }), now());
    assert_eq!(actions, vec![Action::HideControls, Action::RenderNeeded]);
}

// =============================================================
// Touch gestures
// =============================================================

#[test]
fn two_finger_pinch_on_background_zooms() {
    let mut engine = touch_engine();
    seed(&mut engine, now());
    engine.on_touch_start(&[pt(800.0, 600.0), pt(900.0, 600.0)]);
    assert_eq!(engine.input(), &InputState::Pinching);
    engine.on_touch_move(&[pt(750.0, 600.0), pt(950.0, 600.0)]);
    let actions = engine.on_touch_end(&[pt(750.0, 600.0)], 1, now());
    assert_eq!(actions, vec![Action::ZoomChanged(2.0), Action::RenderNeeded]);
    assert_eq!(engine.input(), &InputState::Idle);
}

#[test]
fn second_finger_during_note_drag_is_ignored() {
    let mut engine = touch_engine();
    seed(&mut engine, now());
    engine.on_touch_start(&[pt(150.0, 150.0)]);
    engine.on_touch_start(&[pt(150.0, 150.0), pt(400.0, 400.0)]);
    assert_eq!(engine.input(), &InputState::OnNote { id: id("a") });
    engine.on_touch_move(&[pt(160.0, 150.0), pt(400.0, 400.0)]);
    engine.on_touch_move(&[pt(170.0, 160.0)]);
    let actions = engine.on_touch_end(&[], 1, now());
    assert_eq!(actions[0], Action::NoteMoved { id: id("a"), x: 2120.0, y: 2210.0 });
    assert_eq!(engine.viewport().zoom, 1.0);
}

#[test]
fn lifting_drag_finger_ends_drag_while_another_stays_down() {
    let mut engine = touch_engine();
    seed(&mut engine, now());
    engine.on_touch_start(&[pt(150.0, 150.0)]);
    engine.on_touch_start(&[pt(150.0, 150.0), pt(400.0, 400.0)]);

    let actions = engine.on_touch_end(&[pt(400.0, 400.0)], 1, now());
    assert_eq!(engine.input(), &InputState::Idle);
    assert!(!engine.is_dragging());
    assert!(remote_ops(&actions).is_empty());

    assert!(engine.on_touch_move(&[pt(410.0, 400.0)]).is_empty());
    let actions = engine.tick(now());
    assert!(!actions.iter().any(|a| matches!(a, Action::NoteMoved { .. })));
    assert!(remote_ops(&actions).is_empty());
    let a = engine.note(&id("a")).unwrap();
    assert_eq!((a.x, a.y), (2100.0, 2200.0));
}

#[test]
fn single_finger_on_background_pans() {
    let mut engine = touch_engine();
    engine.on_touch_start(&[pt(500.0, 500.0)]);
    engine.on_touch_move(&[pt(520.0, 470.0)]);
    let actions = engine.on_touch_end(&[], 1, now());
    assert_eq!(actions, vec![Action::PanChanged(pt(-1980.0, -2130.0)), Action::RenderNeeded]);
}

// =============================================================
// Bulk delete / undo
// =============================================================

#[test]
fn bulk_delete_then_undo_restores_everything() {
    let mut engine = engine();
    seed(&mut engine, now());
    engine.bring_to_front(&id("a"));
    let before: Vec<Note> = engine.notes().cloned().collect();

    let t0 = now();
    let deleted = engine.bulk_delete(t0);
    assert_eq!(deleted, vec![
        Action::Remote(RemoteOp::Remove { path: "notes".into() }),
        Action::RenderNeeded,
        Action::Notify(Notice::BulkDeleted { count: 2 }),
    ]);
    assert!(engine.notes().next().is_none());
    assert_eq!(engine.undo_deadline(), Some(t0.instant + ms(3000)));

    let restored = engine.undo(t0.after(ms(1000)));
    assert_eq!(restored.last(), Some(&Action::Notify(Notice::Restored { count: 2 })));
    assert!(matches!(remote_ops(&restored)[..], [RemoteOp::Write { path, .. }] if path == "notes"));
    let after: Vec<Note> = engine.notes().cloned().collect();
    assert_eq!(after, before);
    assert_eq!(order(&engine), vec!["b", "a"]);
}

#[test]
fn bulk_delete_expires_after_grace_period() {
    let mut engine = engine();
    let snapshot = json!({ "1": {}, "2": {}, "3": {}, "4": {}, "5": {} });
    engine.apply_remote_snapshot(&snapshot, now());
    let t0 = now();
    engine.bulk_delete(t0);

    assert!(engine.tick(t0.after(ms(2999))).is_empty());
    assert_eq!(engine.tick(t0.after(ms(3001))), vec![Action::Notify(Notice::UndoExpired)]);
    assert!(engine.undo(t0.after(ms(3002))).is_empty());
    assert!(engine.notes().next().is_none());
}

#[test]
fn bulk_delete_on_empty_wall_only_notifies() {
    let mut engine = engine();
    assert_eq!(engine.bulk_delete(now()), vec![Action::Notify(Notice::NothingToDelete)]);
    assert!(engine.undo(now()).is_empty());
}

// =============================================================
// Teardown
// =============================================================

#[test]
fn teardown_cancels_frames_and_timers() {
    let mut engine = engine();
    seed(&mut engine, now());
    let t0 = now();
    engine.on_pointer_down(pt(150.0, 150.0));
    engine.on_pointer_up(1, t0);
    engine.on_wheel(WheelDelta { dx: 0.0, dy: -1.0 }, ctrl());
    engine.on_pointer_down(pt(550.0, 150.0));
    engine.on_pointer_move(pt(600.0, 200.0));

    engine.teardown();
    assert!(!engine.is_dragging());
    assert_eq!(engine.input(), &InputState::Idle);
    assert!(engine.tick(t0.after(ms(10_000))).is_empty());
    assert_eq!(order(&engine), vec!["a", "b"]);
}

#[test]
fn teardown_drops_open_undo_window() {
    let mut engine = engine();
    seed(&mut engine, now());
    let t0 = now();
    engine.bulk_delete(t0);
    engine.teardown();
    assert!(engine.undo(t0.after(ms(10))).is_empty());
    assert!(engine.tick(t0.after(ms(10_000))).is_empty());
}
