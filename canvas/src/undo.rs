//! Bulk delete with a timed undo window.
//!
//! A bulk delete clears the store and the remote collection at once, then
//! holds a backup of every note until the grace window closes. Undo inside
//! the window restores the backup locally and writes it back remotely. When
//! the window closes the backup is simply dropped; both sides are already
//! empty. Only one window is open at a time: a new bulk delete supersedes the
//! previous backup.
//!
//! The grace deadline is authoritative. An undo arriving at or after the
//! deadline is a no-op even if [`poll_at`](UndoCoordinator::poll_at) has not
//! run yet.

#[cfg(test)]
#[path = "undo_test.rs"]
mod undo_test;

use std::time::{Duration, Instant};

use tracing::info;

use crate::note::Note;
use crate::remote::RemoteOp;
use crate::store::NoteStore;

/// User-facing notifications raised by bulk delete and undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Bulk delete was requested on an empty wall.
    NothingToDelete,
    /// Notes were cleared; undo is available until the window closes.
    BulkDeleted { count: usize },
    Restored { count: usize },
    /// The undo window closed; the deletion is permanent.
    UndoExpired,
}

#[derive(Debug)]
struct Backup {
    notes: Vec<Note>,
    deadline: Instant,
}

/// Owns the single outstanding undo backup.
#[derive(Debug)]
pub struct UndoCoordinator {
    grace: Duration,
    backup: Option<Backup>,
}

impl UndoCoordinator {
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self { grace, backup: None }
    }

    /// Clear every note, keeping a backup until `now + grace`.
    pub fn bulk_delete_at(&mut self, store: &mut NoteStore, now: Instant) -> (Vec<RemoteOp>, Notice) {
        if store.is_empty() {
            return (Vec::new(), Notice::NothingToDelete);
        }
        if self.backup.take().is_some() {
            info!("previous undo window superseded");
        }
        let notes = store.take_all();
        let count = notes.len();
        self.backup = Some(Backup { notes, deadline: now + self.grace });
        info!(count, "bulk delete; undo window open");
        (vec![RemoteOp::Remove { path: store.root().to_owned() }], Notice::BulkDeleted { count })
    }

    /// Restore the backup if its window is still open at `now`.
    pub fn undo_at(&mut self, store: &mut NoteStore, now: Instant) -> Option<(Vec<RemoteOp>, Notice)> {
        if !self.backup.as_ref().is_some_and(|b| now < b.deadline) {
            return None;
        }
        let backup = self.backup.take()?;
        let count = backup.notes.len();
        let ops = store.restore(backup.notes);
        info!(count, "bulk delete undone");
        Some((ops, Notice::Restored { count }))
    }

    /// Close an expired window, returning the expiry notice once.
    pub fn poll_at(&mut self, now: Instant) -> Option<Notice> {
        if !self.backup.as_ref().is_some_and(|b| now >= b.deadline) {
            return None;
        }
        self.backup = None;
        info!("undo window expired");
        Some(Notice::UndoExpired)
    }

    /// Drop the backup silently (view teardown).
    pub fn cancel(&mut self) {
        self.backup = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.backup.is_some()
    }

    /// When the open window closes, if one is open.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.backup.as_ref().map(|b| b.deadline)
    }
}
