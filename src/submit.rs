//! Anonymous submit flow.
//!
//! A visitor composes one note and sends it to the wall. The note gets a
//! random palette color, a random spot in the submit region, and an
//! `<epoch ms><0..10000>` id in its body; the store picks the record key.
//! Unlike wall edits, a failed submit is reported to the caller.

use canvas::consts::SUBMIT_PALETTE;
use canvas::note::{Note, NoteId};
use canvas::richtext::RichText;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::remote::{RealtimeStore, RemoteError};

pub const SUBMIT_AUTHOR: &str = "anonymous";
pub const SUBMIT_X_MIN: f64 = 800.0;
pub const SUBMIT_Y_MIN: f64 = 400.0;
/// Side of the square region submitted notes land in.
pub const SUBMIT_SPAN: f64 = 400.0;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("note has no text and no drawing")]
    EmptyNote,

    #[error("failed to send note: {0}")]
    Remote(#[from] RemoteError),
}

/// A fresh draft for the submit page: defaults plus a random palette color.
pub fn blank_draft<R: Rng>(rng: &mut R) -> Note {
    let mut note = Note::new_local(NoteId::new(""), 0, rng);
    note.background_color = (*SUBMIT_PALETTE.choose(rng).unwrap_or(&SUBMIT_PALETTE[0])).to_owned();
    note
}

/// Whether the send button should be enabled for `draft`.
#[must_use]
pub fn is_submittable(draft: &Note) -> bool {
    let has_drawing = draft.drawing_data.as_ref().is_some_and(canvas::note::DrawingData::has_strokes);
    has_drawing || RichText::from_markup(&draft.text).has_visible_text()
}

/// Build the record appended to the notes collection.
///
/// Position, id, author, and timestamps are assigned here; everything else
/// comes from the draft.
///
/// # Errors
///
/// Returns [`SubmitError::EmptyNote`] when the draft has nothing to show.
pub fn prepare<R: Rng>(draft: &Note, now_ms: i64, rng: &mut R) -> Result<Value, SubmitError> {
    if !is_submittable(draft) {
        return Err(SubmitError::EmptyNote);
    }
    let mut note = draft.clone();
    note.id = NoteId::new(format!("{now_ms}{}", rng.random_range(0..10_000)));
    note.x = SUBMIT_X_MIN + rng.random::<f64>() * SUBMIT_SPAN;
    note.y = SUBMIT_Y_MIN + rng.random::<f64>() * SUBMIT_SPAN;
    note.created_at = now_ms;
    note.updated_at = now_ms;

    let mut record = note.to_record();
    if let Value::Object(fields) = &mut record {
        fields.insert("author".into(), json!(SUBMIT_AUTHOR));
    }
    Ok(record)
}

/// Append a prepared record under `notes_path`. Returns the store-generated key.
///
/// # Errors
///
/// Returns [`SubmitError::Remote`] when the store refuses the write.
pub async fn submit(store: &dyn RealtimeStore, notes_path: &str, record: Value) -> Result<String, SubmitError> {
    match store.append(notes_path, record).await {
        Ok(key) => {
            info!(%key, "note submitted");
            Ok(key)
        }
        Err(e) => {
            warn!(error = %e, "note submit failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod tests;
