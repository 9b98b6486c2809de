//! Write-through descriptors for the remote collaborator.
//!
//! The engine never talks to the realtime store itself. Every local mutation
//! returns the [`RemoteOp`]s that mirror it, and the host executes them
//! fire-and-forget. Paths are slash-separated (`notes`, `notes/{id}`).

use serde_json::Value;

use crate::note::NoteId;

/// A single write against the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOp {
    /// Replace the value at `path`.
    Write { path: String, value: Value },
    /// Merge the fields of `value` into the value at `path`.
    Patch { path: String, value: Value },
    /// Delete the value at `path`.
    Remove { path: String },
}

impl RemoteOp {
    /// The path this op targets.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Write { path, .. } | Self::Patch { path, .. } | Self::Remove { path } => path,
        }
    }
}

/// Path of a single note under the collection root.
#[must_use]
pub fn note_path(root: &str, id: &NoteId) -> String {
    format!("{root}/{id}")
}
