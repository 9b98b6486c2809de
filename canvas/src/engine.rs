//! Interaction engine for the wall.
//!
//! `EngineCore` composes the viewport, drag, click, store, and undo
//! controllers and routes raw input to them. It never touches the remote
//! store or the screen: every handler returns [`Action`]s for the host to
//! apply (persist `Remote` ops, update the view, open dialogs).
//!
//! Time is an input. Handlers that stamp notes or schedule timers take a
//! [`Now`]; the host calls [`EngineCore::tick`] once per animation frame to
//! commit coalesced gestures and fire due timers.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::debug;

use crate::camera::{Point, ScreenSize, Viewport};
use crate::consts::{
    CANVAS_SIZE, CLICK_DELAY_MS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, NOTES_PATH, UNDO_GRACE_MS,
};
use crate::drag::{DragGate, DragUpdate, NoteDragController};
use crate::gesture::{ClickDisambiguator, GestureAction};
use crate::hit::hit_test;
use crate::input::{Control, DeviceClass, InputState, Modifiers, UiState, WheelDelta};
use crate::note::{Note, NoteId};
use crate::remote::RemoteOp;
use crate::store::NoteStore;
use crate::undo::{Notice, UndoCoordinator};
use crate::viewport::{ViewChange, ViewportController};

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ZoomChanged(f64),
    PanChanged(Point),
    NoteMoved { id: NoteId, x: f64, y: f64 },
    /// A deferred single click resolved; the note was raised.
    NoteClicked(NoteId),
    NoteDeleted(NoteId),
    OpenEditor(Note),
    /// Read-only view surface.
    OpenViewer(Note),
    ShowControls(NoteId),
    HideControls,
    /// Ask the user to confirm, then call [`EngineCore::delete_note`].
    ConfirmDelete(NoteId),
    /// Write-through for the remote store; fire-and-forget.
    Remote(RemoteOp),
    Notify(Notice),
    RenderNeeded,
}

/// A point in time seen both as a monotonic instant (timers) and as epoch
/// milliseconds (note timestamps).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub instant: Instant,
    pub epoch_ms: i64,
}

impl Now {
    #[must_use]
    pub fn current() -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        Self { instant: Instant::now(), epoch_ms }
    }

    /// The same clock `by` later.
    #[must_use]
    pub fn after(self, by: Duration) -> Self {
        let by_ms = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        Self { instant: self.instant + by, epoch_ms: self.epoch_ms.saturating_add(by_ms) }
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Side of the square world canvas.
    pub canvas_size: f64,
    /// Initial screen size; updated later through `set_viewport_size`.
    pub screen: ScreenSize,
    pub click_delay: Duration,
    pub undo_grace: Duration,
    pub device: DeviceClass,
    /// Remote path of the note collection.
    pub notes_path: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            canvas_size: CANVAS_SIZE,
            screen: ScreenSize::new(DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            click_delay: Duration::from_millis(CLICK_DELAY_MS),
            undo_grace: Duration::from_millis(UNDO_GRACE_MS),
            device: DeviceClass::default(),
            notes_path: NOTES_PATH.to_owned(),
        }
    }
}

/// Core engine state: all interaction logic, independent of any host.
pub struct EngineCore {
    store: NoteStore,
    viewport: ViewportController,
    drag: NoteDragController,
    clicks: ClickDisambiguator,
    undo: UndoCoordinator,
    ui: UiState,
    input: InputState,
    rng: StdRng,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_rng(settings, StdRng::from_rng(&mut rand::rng()))
    }

    /// An engine whose default note placement is reproducible.
    #[must_use]
    pub fn with_seed(settings: EngineSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: EngineSettings, rng: StdRng) -> Self {
        let gate = DragGate::new();
        Self {
            store: NoteStore::new(settings.notes_path),
            viewport: ViewportController::new(settings.screen, settings.canvas_size, gate.clone()),
            drag: NoteDragController::new(gate),
            clicks: ClickDisambiguator::new(settings.device, settings.click_delay),
            undo: UndoCoordinator::new(settings.undo_grace),
            ui: UiState { device: settings.device, controls_for: None },
            input: InputState::Idle,
            rng,
        }
    }

    // --- Data inputs ---

    /// Replace the collection with a full snapshot from the feed.
    pub fn apply_remote_snapshot(&mut self, snapshot: &Value, now: Now) -> Vec<Action> {
        self.store.apply_remote_snapshot(snapshot, now.epoch_ms, &mut self.rng);
        let mut actions = Vec::new();
        if let Some(id) = self.ui.controls_for.clone() {
            if !self.store.contains(&id) {
                self.ui.controls_for = None;
                actions.push(Action::HideControls);
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Create a blank note on top of the wall.
    pub fn create_note(&mut self, now: Now) -> (NoteId, Vec<Action>) {
        let id = self.store.allocate_id(now.epoch_ms);
        let note = Note::new_local(id, now.epoch_ms, &mut self.rng);
        let (id, ops) = self.store.create_local(note);
        (id, remote_actions(ops))
    }

    /// Save an edited (or new) note and raise it.
    pub fn save_note(&mut self, note: Note, now: Now) -> Vec<Action> {
        remote_actions(self.store.save(note, now.epoch_ms))
    }

    /// Move a note and raise it. Unknown ids are ignored.
    pub fn move_note(&mut self, id: &NoteId, x: f64, y: f64, now: Now) -> Vec<Action> {
        let ops = self.store.move_note(id, x, y, now.epoch_ms);
        if ops.is_empty() {
            return Vec::new();
        }
        let mut actions = vec![Action::NoteMoved { id: id.clone(), x, y }];
        actions.extend(remote_actions(ops));
        actions
    }

    /// Raise a note without changing it.
    pub fn bring_to_front(&mut self, id: &NoteId) -> Vec<Action> {
        if self.store.bring_to_front(id) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Delete one note. Unknown ids are ignored.
    pub fn delete_note(&mut self, id: &NoteId) -> Vec<Action> {
        let ops = self.store.delete(id);
        if ops.is_empty() {
            return Vec::new();
        }
        if self.drag.dragging() == Some(id) {
            self.drag.teardown();
            self.input = InputState::Idle;
        }
        let mut actions = Vec::new();
        if self.ui.controls_for.as_ref() == Some(id) {
            self.ui.controls_for = None;
            actions.push(Action::HideControls);
        }
        actions.push(Action::NoteDeleted(id.clone()));
        actions.extend(remote_actions(ops));
        actions
    }

    /// Clear the wall, keeping an undo backup for the grace period.
    pub fn bulk_delete(&mut self, now: Now) -> Vec<Action> {
        if !self.store.is_empty() {
            self.drag.teardown();
            self.clicks.cancel();
            self.input = InputState::Idle;
            self.ui.controls_for = None;
        }
        let (ops, notice) = self.undo.bulk_delete_at(&mut self.store, now.instant);
        let mut actions = remote_actions(ops);
        actions.push(Action::Notify(notice));
        actions
    }

    /// Undo the last bulk delete if its grace period is still open.
    pub fn undo(&mut self, now: Now) -> Vec<Action> {
        let Some((ops, notice)) = self.undo.undo_at(&mut self.store, now.instant) else {
            return Vec::new();
        };
        let mut actions = remote_actions(ops);
        actions.push(Action::Notify(notice));
        actions
    }

    // --- Viewport ---

    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        view_actions(self.viewport.set_screen(ScreenSize::new(width, height)))
    }

    /// Zoom 1 with the canvas centred.
    pub fn reset_zoom(&mut self) -> Vec<Action> {
        view_actions(self.viewport.reset())
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        view_actions(self.viewport.zoom_in())
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        view_actions(self.viewport.zoom_out())
    }

    /// Wheel or trackpad scroll; committed on the next tick.
    pub fn on_wheel(&mut self, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.viewport.wheel(delta, modifiers);
        Vec::new()
    }

    // --- Pointer input ---

    /// Primary pointer pressed at `screen_pt`.
    ///
    /// Pressing a note starts a note drag; pressing the background starts a
    /// pan unless a note drag already holds the gate.
    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.input != InputState::Idle {
            return Vec::new();
        }
        let world = self.viewport.viewport().screen_to_world(screen_pt);
        let target = hit_test(world, &self.store).and_then(|id| self.store.get(&id).map(|n| (id, n.origin())));
        match target {
            Some((id, origin)) => {
                debug!(note_id = %id, "note drag armed");
                self.drag.begin(id.clone(), origin, world);
                self.input = InputState::OnNote { id };
            }
            None => {
                if self.viewport.pan_start(screen_pt) {
                    self.input = InputState::Panning;
                }
            }
        }
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::OnNote { .. } => {
                let world = self.viewport.viewport().screen_to_world(screen_pt);
                self.drag.pointer_move(world);
            }
            InputState::Panning => self.viewport.pan_move(screen_pt),
            InputState::Idle | InputState::Pinching => {}
        }
        Vec::new()
    }

    /// Primary pointer released. `detail` is the platform click count.
    pub fn on_pointer_up(&mut self, detail: u32, now: Now) -> Vec<Action> {
        self.finish_gesture(Some(detail), now)
    }

    /// The pointer left the window or the platform cancelled the gesture.
    ///
    /// Ends the gesture like a pointer-up but never counts as a click.
    pub fn on_pointer_cancel(&mut self, now: Now) -> Vec<Action> {
        self.finish_gesture(None, now)
    }

    /// The pointer entered a note (hover devices only).
    pub fn on_pointer_enter(&mut self, id: &NoteId) -> Vec<Action> {
        if !self.store.contains(id) {
            return Vec::new();
        }
        let action = self.clicks.pointer_enter(id.clone(), self.drag.is_active());
        action.map_or_else(Vec::new, |a| self.apply_gesture(a))
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let action = self.clicks.pointer_leave(self.drag.is_active());
        action.map_or_else(Vec::new, |a| self.apply_gesture(a))
    }

    /// A note's control button was pressed.
    pub fn on_control(&mut self, id: &NoteId, control: Control) -> Vec<Action> {
        if !self.store.contains(id) {
            return Vec::new();
        }
        let action = self.clicks.control(id.clone(), control);
        self.apply_gesture(action)
    }

    // --- Touch input ---

    /// Touches currently down after a touch-start.
    ///
    /// One finger behaves like a pointer. Two fingers start a pinch unless a
    /// note drag is already in progress, in which case they are ignored.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Action> {
        match touches {
            [] => {}
            [one] => return self.on_pointer_down(*one),
            [a, b, ..] => match self.input {
                InputState::OnNote { .. } | InputState::Pinching => {}
                InputState::Idle | InputState::Panning => {
                    if self.viewport.pinch_start(*a, *b) {
                        self.input = InputState::Pinching;
                    }
                }
            },
        }
        Vec::new()
    }

    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        let pinching = self.input == InputState::Pinching;
        match touches {
            [a, b, ..] if pinching => self.viewport.pinch_move(*a, *b),
            [one] if !pinching => return self.on_pointer_move(*one),
            _ => {}
        }
        Vec::new()
    }

    /// Touches still down after a touch-end. `detail` is the tap count.
    ///
    /// Revealed controls are hidden on every touch end; a resulting tap may
    /// reveal them again. A note drag ends on the first lifted finger, so a
    /// finger left on the glass never inherits the drag.
    pub fn on_touch_end(&mut self, remaining: &[Point], detail: u32, now: Now) -> Vec<Action> {
        let mut actions = self.hide_controls_on_touch();
        let done = match self.input {
            InputState::Pinching => remaining.len() < 2,
            InputState::OnNote { .. } => true,
            InputState::Panning => remaining.is_empty(),
            InputState::Idle => false,
        };
        if done {
            actions.extend(self.finish_gesture(Some(detail), now));
        }
        actions
    }

    pub fn on_touch_cancel(&mut self, now: Now) -> Vec<Action> {
        let mut actions = self.hide_controls_on_touch();
        actions.extend(self.finish_gesture(None, now));
        actions
    }

    // --- Frame ---

    /// Commit coalesced gestures and fire due timers.
    pub fn tick(&mut self, now: Now) -> Vec<Action> {
        let mut actions = view_actions(self.viewport.tick());
        if let Some(update) = self.drag.tick() {
            actions.extend(self.commit_drag(update, now));
        }
        if let Some(action) = self.clicks.poll_at(now.instant) {
            actions.extend(self.apply_gesture(action));
        }
        if let Some(notice) = self.undo.poll_at(now.instant) {
            actions.push(Action::Notify(notice));
        }
        actions
    }

    /// Cancel every pending frame update and timer; nothing fires afterwards.
    pub fn teardown(&mut self) {
        self.viewport.teardown();
        self.drag.teardown();
        self.clicks.cancel();
        self.undo.cancel();
        self.input = InputState::Idle;
    }

    // --- Queries ---

    /// Notes in paint order, bottom first.
    pub fn notes(&self) -> impl DoubleEndedIterator<Item = &Note> {
        self.store.ordered()
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.store.get(id)
    }

    #[must_use]
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    #[must_use]
    pub fn screen(&self) -> ScreenSize {
        self.viewport.screen()
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// When the open undo window closes, if one is open.
    #[must_use]
    pub fn undo_deadline(&self) -> Option<Instant> {
        self.undo.deadline()
    }

    // --- Internals ---

    fn finish_gesture(&mut self, detail: Option<u32>, now: Now) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        match state {
            InputState::OnNote { .. } => {
                let Some(end) = self.drag.end() else {
                    return Vec::new();
                };
                if end.moved {
                    return end.flushed.map_or_else(Vec::new, |update| self.commit_drag(update, now));
                }
                match detail.and_then(|d| self.clicks.click_at(end.id, d, now.instant)) {
                    Some(action) => self.apply_gesture(action),
                    None => Vec::new(),
                }
            }
            InputState::Panning => view_actions(self.viewport.pan_end()),
            InputState::Pinching => view_actions(self.viewport.pinch_end()),
            InputState::Idle => Vec::new(),
        }
    }

    fn commit_drag(&mut self, update: DragUpdate, now: Now) -> Vec<Action> {
        self.move_note(&update.id, update.x, update.y, now)
    }

    fn apply_gesture(&mut self, action: GestureAction) -> Vec<Action> {
        match action {
            GestureAction::BringToFront(id) => {
                if self.store.bring_to_front(&id) {
                    vec![Action::NoteClicked(id), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            GestureAction::OpenEditor(id) => self.raise_and_open(&id, Action::OpenEditor),
            GestureAction::OpenViewer(id) => self.raise_and_open(&id, Action::OpenViewer),
            GestureAction::ShowControls(id) => {
                self.ui.controls_for = Some(id.clone());
                vec![Action::ShowControls(id)]
            }
            GestureAction::HideControls => {
                self.ui.controls_for = None;
                vec![Action::HideControls]
            }
            GestureAction::ConfirmDelete(id) => vec![Action::ConfirmDelete(id)],
        }
    }

    fn raise_and_open(&mut self, id: &NoteId, open: fn(Note) -> Action) -> Vec<Action> {
        if !self.store.bring_to_front(id) {
            return Vec::new();
        }
        match self.store.get(id) {
            Some(note) => vec![open(note.clone()), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    fn hide_controls_on_touch(&mut self) -> Vec<Action> {
        if self.ui.controls_for.take().is_some() { vec![Action::HideControls] } else { Vec::new() }
    }
}

fn remote_actions(ops: Vec<RemoteOp>) -> Vec<Action> {
    if ops.is_empty() {
        return Vec::new();
    }
    let mut actions: Vec<Action> = ops.into_iter().map(Action::Remote).collect();
    actions.push(Action::RenderNeeded);
    actions
}

fn view_actions(change: Option<ViewChange>) -> Vec<Action> {
    let Some(change) = change else {
        return Vec::new();
    };
    let mut actions = Vec::new();
    if change.zoom_changed() {
        actions.push(Action::ZoomChanged(change.after.zoom));
    }
    if change.pan_changed() {
        actions.push(Action::PanChanged(change.after.pan));
    }
    actions.push(Action::RenderNeeded);
    actions
}
