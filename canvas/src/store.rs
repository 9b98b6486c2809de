//! Note collection: the client-side mirror of every note on the wall.
//!
//! The store merges two writers. The snapshot feed replaces the whole
//! collection on every remote change, and local optimistic edits mutate it in
//! between. Stacking order lives only here: it is rebuilt from ascending
//! `createdAt` on each snapshot and afterwards follows interaction history,
//! with the most recently touched note last (topmost).
//!
//! Every mutating method returns the [`RemoteOp`]s that mirror it. Applying
//! them is the host's job; a failed write never rolls the local state back.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use indexmap::IndexMap;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::debug;

use crate::consts::NOTES_PATH;
use crate::note::{Note, NoteId, position_patch};
use crate::remote::{RemoteOp, note_path};

/// In-memory, z-ordered collection of notes. First = bottom, last = top.
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes: IndexMap<NoteId, Note>,
    root: String,
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new(NOTES_PATH)
    }
}

impl NoteStore {
    /// Create an empty store mirroring the collection at `root`.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self { notes: IndexMap::new(), root: root.into() }
    }

    /// Remote path of the whole collection.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    // --- Remote feed ---

    /// Replace the collection with a full snapshot of the remote value.
    ///
    /// `snapshot` maps note id to raw record; anything other than an object
    /// (including null, which the feed delivers for an empty collection)
    /// empties the store. Notes are ordered by ascending `createdAt`.
    pub fn apply_remote_snapshot<R: Rng>(&mut self, snapshot: &Value, now: i64, rng: &mut R) {
        let mut incoming: Vec<Note> = snapshot
            .as_object()
            .map(|records| {
                records
                    .iter()
                    .map(|(id, record)| Note::from_record(id, record, now, rng))
                    .collect()
            })
            .unwrap_or_default();
        incoming.sort_by_key(|note| note.created_at);

        self.notes = incoming.into_iter().map(|note| (note.id.clone(), note)).collect();
        debug!(count = self.notes.len(), "applied remote snapshot");
    }

    // --- Local edits ---

    /// Pick an id for a note created at `stamp`, unique within the collection.
    ///
    /// Ids are millisecond timestamps; on collision the stamp is bumped.
    #[must_use]
    pub fn allocate_id(&self, stamp: i64) -> NoteId {
        let mut candidate = stamp;
        loop {
            let id = NoteId::new(candidate.to_string());
            if !self.notes.contains_key(&id) {
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }

    /// Insert a freshly created note on top.
    ///
    /// If the caller's id is already taken a fresh one is allocated so ids
    /// stay unique. Returns the id the note was stored under.
    pub fn create_local(&mut self, mut note: Note) -> (NoteId, Vec<RemoteOp>) {
        if self.notes.contains_key(&note.id) {
            note.id = self.allocate_id(note.created_at);
        }
        let id = note.id.clone();
        let ops = vec![RemoteOp::Write { path: note_path(&self.root, &id), value: note.to_record() }];
        self.notes.insert(id.clone(), note);
        debug!(note_id = %id, "created note");
        (id, ops)
    }

    /// Create or update a note and move it on top.
    ///
    /// `updatedAt` is always set to `stamp`, whatever the caller supplied.
    pub fn save(&mut self, mut note: Note, stamp: i64) -> Vec<RemoteOp> {
        note.updated_at = stamp;
        let id = note.id.clone();
        let op = RemoteOp::Write { path: note_path(&self.root, &id), value: note.to_record() };
        self.notes.shift_remove(&id);
        self.notes.insert(id.clone(), note);
        debug!(note_id = %id, "saved note");
        vec![op]
    }

    /// Move a note and bring it to front. Unknown ids are ignored.
    pub fn move_note(&mut self, id: &NoteId, x: f64, y: f64, stamp: i64) -> Vec<RemoteOp> {
        let Some(mut note) = self.notes.shift_remove(id) else {
            return Vec::new();
        };
        note.x = x;
        note.y = y;
        note.updated_at = stamp;
        self.notes.insert(id.clone(), note);
        vec![RemoteOp::Patch { path: note_path(&self.root, id), value: position_patch(x, y, stamp) }]
    }

    /// Move a note on top without touching it. Returns false for unknown ids.
    ///
    /// Stacking order is local only, so nothing is written remotely.
    pub fn bring_to_front(&mut self, id: &NoteId) -> bool {
        let Some(index) = self.notes.get_index_of(id) else {
            return false;
        };
        let last = self.notes.len() - 1;
        self.notes.move_index(index, last);
        true
    }

    /// Remove a note. Unknown ids are ignored.
    pub fn delete(&mut self, id: &NoteId) -> Vec<RemoteOp> {
        if self.notes.shift_remove(id).is_none() {
            return Vec::new();
        }
        debug!(note_id = %id, "deleted note");
        vec![RemoteOp::Remove { path: note_path(&self.root, id) }]
    }

    /// Empty the collection, returning its notes bottom-to-top.
    pub fn take_all(&mut self) -> Vec<Note> {
        std::mem::take(&mut self.notes).into_values().collect()
    }

    /// Replace the collection with `notes`, stacked in the given order so the
    /// last one ends up on top. Timestamps are kept as they were.
    pub fn restore(&mut self, notes: Vec<Note>) -> Vec<RemoteOp> {
        self.notes = notes.into_iter().map(|note| (note.id.clone(), note)).collect();
        vec![RemoteOp::Write { path: self.root.clone(), value: self.collection_record() }]
    }

    // --- Queries ---

    /// Notes in paint order, bottom first.
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &Note> {
        self.notes.values()
    }

    /// Ids in paint order, bottom first.
    #[must_use]
    pub fn order(&self) -> Vec<NoteId> {
        self.notes.keys().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The whole collection as the id-keyed value stored at the root.
    #[must_use]
    pub fn collection_record(&self) -> Value {
        let map: Map<String, Value> = self
            .notes
            .iter()
            .map(|(id, note)| (id.as_str().to_owned(), note.to_record()))
            .collect();
        Value::Object(map)
    }
}
