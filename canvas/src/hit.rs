//! Hit testing against the nominal note boxes.
//!
//! Notes are painted 1.25× larger than their nominal size, but picking uses
//! the nominal box so geometry stays consistent with the stored record.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::note::NoteId;
use crate::store::NoteStore;

/// The topmost note whose nominal box contains `world_pt`.
#[must_use]
pub fn hit_test(world_pt: Point, store: &NoteStore) -> Option<NoteId> {
    store.ordered().rev().find(|note| note.contains(world_pt)).map(|note| note.id.clone())
}
