//! Note dragging and the drag gate shared with the viewport.
//!
//! DESIGN
//! ======
//! A drag keeps the pointer-to-origin offset captured at pointer-down for the
//! whole gesture, so the note never jumps to re-centre under the pointer.
//! Moves are parked in a [`Coalesced`] slot and emitted once per tick. The
//! terminating event flushes whatever is still pending, which makes the final
//! position independent of how many frames the gesture spanned.
//!
//! While a drag is active the [`DragGate`] is engaged. The viewport checks it
//! before accepting any pan, so a finger dragging a note never also drags the
//! wall underneath it.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::camera::Point;
use crate::coalesce::Coalesced;
use crate::note::NoteId;

/// Advisory "a note is being dragged" flag.
///
/// Clones share the same flag; every controller that pans must check it
/// before acting.
#[derive(Debug, Clone, Default)]
pub struct DragGate(Arc<AtomicBool>);

impl DragGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_engaged(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A committed position for the dragged note.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub id: NoteId,
    pub x: f64,
    pub y: f64,
}

/// How a drag gesture finished.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEnd {
    pub id: NoteId,
    /// At least one move was seen; a drag, not a click.
    pub moved: bool,
    /// Last position not yet committed by a tick, if any.
    pub flushed: Option<DragUpdate>,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    id: NoteId,
    offset: Point,
    moved: bool,
}

/// Tracks a single note drag from pointer-down to pointer-up.
#[derive(Debug)]
pub struct NoteDragController {
    gate: DragGate,
    active: Option<ActiveDrag>,
    pending: Coalesced<Point>,
}

impl NoteDragController {
    #[must_use]
    pub fn new(gate: DragGate) -> Self {
        Self { gate, active: None, pending: Coalesced::new() }
    }

    /// Start dragging `id`, whose top-left corner is at `origin`.
    ///
    /// `pointer` is in world coordinates. Any drag already in progress is
    /// abandoned without committing its pending move.
    pub fn begin(&mut self, id: NoteId, origin: Point, pointer: Point) {
        self.pending.cancel();
        self.active = Some(ActiveDrag { id, offset: pointer - origin, moved: false });
        self.gate.engage();
    }

    /// Record a pointer move (world coordinates). Ignored when idle.
    pub fn pointer_move(&mut self, pointer: Point) {
        let Some(drag) = self.active.as_mut() else {
            return;
        };
        drag.moved = true;
        self.pending.schedule(pointer - drag.offset);
    }

    /// Commit the move parked since the last tick.
    pub fn tick(&mut self) -> Option<DragUpdate> {
        let drag = self.active.as_ref()?;
        let origin = self.pending.take()?;
        Some(DragUpdate { id: drag.id.clone(), x: origin.x, y: origin.y })
    }

    /// Finish the gesture, flushing any pending move and releasing the gate.
    ///
    /// Pointer-up, touch-end, and pointer-cancel all finish a drag the same
    /// way. Returns `None` when no drag was active.
    pub fn end(&mut self) -> Option<DragEnd> {
        let drag = self.active.take()?;
        self.gate.release();
        let flushed = self.pending.take().map(|origin| DragUpdate { id: drag.id.clone(), x: origin.x, y: origin.y });
        Some(DragEnd { id: drag.id, moved: drag.moved, flushed })
    }

    /// Drop the gesture without committing anything.
    pub fn teardown(&mut self) {
        if self.active.take().is_some() {
            self.gate.release();
        }
        self.pending.cancel();
    }

    /// The note being dragged, if any.
    #[must_use]
    pub fn dragging(&self) -> Option<&NoteId> {
        self.active.as_ref().map(|d| &d.id)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn gate(&self) -> &DragGate {
        &self.gate
    }
}
