//! Click disambiguation for completed, non-drag note interactions.
//!
//! Hover-capable devices defer a single click by a short delay so a second
//! click can upgrade it to "edit". Touch-only devices act immediately: the
//! first tap reveals the note's controls and a double tap opens the viewer.
//! Control buttons and drags never reach this module's click path.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::time::{Duration, Instant};

use crate::input::{Control, DeviceClass};
use crate::note::NoteId;

/// What a resolved interaction asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureAction {
    /// Non-modal feedback: raise the note.
    BringToFront(NoteId),
    OpenEditor(NoteId),
    /// Read-only view surface.
    OpenViewer(NoteId),
    ShowControls(NoteId),
    HideControls,
    /// The delete control was pressed; the host confirms before deleting.
    ConfirmDelete(NoteId),
}

#[derive(Debug, Clone)]
struct PendingClick {
    id: NoteId,
    deadline: Instant,
}

/// Classifies clicks by device class and click count.
#[derive(Debug)]
pub struct ClickDisambiguator {
    device: DeviceClass,
    delay: Duration,
    pending: Option<PendingClick>,
}

impl ClickDisambiguator {
    #[must_use]
    pub fn new(device: DeviceClass, delay: Duration) -> Self {
        Self { device, delay, pending: None }
    }

    /// A click landed on the body of note `id`. `detail` is the click count.
    ///
    /// Every click clears the previous pending single click, so a double
    /// click never also raises the note.
    pub fn click_at(&mut self, id: NoteId, detail: u32, now: Instant) -> Option<GestureAction> {
        self.pending = None;
        match (self.device, detail >= 2) {
            (DeviceClass::Hover, true) => Some(GestureAction::OpenEditor(id)),
            (DeviceClass::Hover, false) => {
                self.pending = Some(PendingClick { id, deadline: now + self.delay });
                None
            }
            (DeviceClass::TouchOnly, true) => Some(GestureAction::OpenViewer(id)),
            (DeviceClass::TouchOnly, false) => Some(GestureAction::ShowControls(id)),
        }
    }

    /// A control button was pressed. Controls bypass click disambiguation.
    #[must_use]
    pub fn control(&self, id: NoteId, control: Control) -> GestureAction {
        match control {
            Control::Edit => GestureAction::OpenEditor(id),
            Control::Delete => GestureAction::ConfirmDelete(id),
        }
    }

    /// The pointer entered a note. Hover devices reveal its controls unless
    /// a drag is in progress.
    #[must_use]
    pub fn pointer_enter(&self, id: NoteId, dragging: bool) -> Option<GestureAction> {
        (self.device == DeviceClass::Hover && !dragging).then_some(GestureAction::ShowControls(id))
    }

    /// The pointer left a note.
    #[must_use]
    pub fn pointer_leave(&self, dragging: bool) -> Option<GestureAction> {
        (self.device == DeviceClass::Hover && !dragging).then_some(GestureAction::HideControls)
    }

    /// Resolve a pending single click whose delay has passed by `now`.
    pub fn poll_at(&mut self, now: Instant) -> Option<GestureAction> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            return self.pending.take().map(|p| GestureAction::BringToFront(p.id));
        }
        None
    }

    /// Drop any pending single click.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Note whose single click is waiting on the timer.
    #[must_use]
    pub fn pending(&self) -> Option<&NoteId> {
        self.pending.as_ref().map(|p| &p.id)
    }
}
