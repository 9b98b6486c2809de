//! Remote collaborator: the realtime JSON store behind the wall.
//!
//! DESIGN
//! ======
//! The store is a tree of JSON values addressed by slash-separated paths
//! (`notes`, `notes/{id}`). Subscribers receive the full value at their path
//! on every change. Writes are fire-and-forget from the engine's point of
//! view; the session executes them in order on a writer task and logs
//! failures without touching local state.

pub mod memory;

use async_trait::async_trait;
use canvas::remote::RemoteOp;
use serde_json::Value;
use tokio::sync::watch;

pub use memory::MemoryStore;

/// Errors produced by remote store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The store cannot be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// Security rules refused the operation.
    #[error("permission denied at {path}")]
    PermissionDenied { path: String },

    /// The path is empty or has empty segments.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// The store refused the payload.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Live view of the value at one path.
///
/// The first call to [`Subscription::next`] yields the current value; each
/// later call waits for the next change.
#[derive(Debug)]
pub struct Subscription {
    path: String,
    rx: watch::Receiver<Value>,
}

impl Subscription {
    #[must_use]
    pub fn new(path: impl Into<String>, mut rx: watch::Receiver<Value>) -> Self {
        rx.mark_changed();
        Self { path: path.into(), rx }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next snapshot. `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Value> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }
}

#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Subscribe to full snapshots of the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the path is invalid or the store is unreachable.
    async fn subscribe(&self, path: &str) -> Result<Subscription, RemoteError>;

    /// Replace the value at `path`. Writing `null` removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write is refused.
    async fn write(&self, path: &str, value: Value) -> Result<(), RemoteError>;

    /// Merge the fields of `value` (an object) into the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write is refused or `value` is not an object.
    async fn patch(&self, path: &str, value: Value) -> Result<(), RemoteError>;

    /// Delete the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the delete is refused.
    async fn remove(&self, path: &str) -> Result<(), RemoteError>;

    /// Add `value` under a new store-generated, time-ordered key. Returns the key.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the write is refused.
    async fn append(&self, path: &str, value: Value) -> Result<String, RemoteError>;
}

/// Execute one engine write-through op.
///
/// # Errors
///
/// Returns whatever the store returned.
pub async fn execute(store: &dyn RealtimeStore, op: RemoteOp) -> Result<(), RemoteError> {
    match op {
        RemoteOp::Write { path, value } => store.write(&path, value).await,
        RemoteOp::Patch { path, value } => store.patch(&path, value).await,
        RemoteOp::Remove { path } => store.remove(&path).await,
    }
}

/// Split a slash-separated path into its segments.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, RemoteError> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(RemoteError::InvalidPath(path.to_owned()));
    }
    Ok(parts)
}
