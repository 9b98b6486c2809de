//! In-process realtime store.
//!
//! Holds the whole tree in one JSON value behind a mutex. Every mutation
//! re-reads each subscribed path and pushes the value to its watchers when
//! it changed. Used by the headless runner and by tests, which can make
//! writes fail on demand.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};
use tracing::debug;

use super::{RealtimeStore, RemoteError, Subscription, segments};

#[derive(Default)]
struct Inner {
    root: Value,
    watchers: Vec<(String, watch::Sender<Value>)>,
    failure: Option<RemoteError>,
    last_key_ms: u64,
    key_seq: u32,
}

/// Shared in-memory store. Clones share the same tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value currently stored at `path` (`null` when absent).
    pub async fn get(&self, path: &str) -> Value {
        let inner = self.inner.lock().await;
        segments(path).map_or(Value::Null, |segs| lookup(&inner.root, &segs).cloned().unwrap_or(Value::Null))
    }

    /// Make every following write fail with `failure`; `None` heals the store.
    pub async fn fail_writes(&self, failure: Option<RemoteError>) {
        self.inner.lock().await.failure = failure;
    }

    async fn mutate(&self, path: &str, apply: impl FnOnce(&mut Value) -> Result<(), RemoteError>) -> Result<(), RemoteError> {
        let segs = segments(path)?;
        let mut inner = self.inner.lock().await;
        if let Some(failure) = inner.failure.clone() {
            return Err(failure);
        }
        apply(slot(&mut inner.root, &segs))?;
        prune(&mut inner.root);
        inner.notify();
        Ok(())
    }
}

impl Inner {
    fn notify(&mut self) {
        self.watchers.retain(|(_, tx)| !tx.is_closed());
        for (path, tx) in &self.watchers {
            let current = segments(path)
                .ok()
                .and_then(|segs| lookup(&self.root, &segs).cloned())
                .unwrap_or(Value::Null);
            tx.send_if_modified(|seen| {
                if *seen == current {
                    return false;
                }
                *seen = current;
                true
            });
        }
    }

    /// Time-ordered key: zero-padded epoch milliseconds plus a per-millisecond sequence.
    fn next_key(&mut self) -> String {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        if now_ms > self.last_key_ms {
            self.last_key_ms = now_ms;
            self.key_seq = 0;
        } else {
            self.key_seq += 1;
        }
        format!("{:013}-{:06}", self.last_key_ms, self.key_seq)
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn subscribe(&self, path: &str) -> Result<Subscription, RemoteError> {
        let segs = segments(path)?;
        let mut inner = self.inner.lock().await;
        let current = lookup(&inner.root, &segs).cloned().unwrap_or(Value::Null);
        let (tx, rx) = watch::channel(current);
        inner.watchers.push((path.to_owned(), tx));
        debug!(path, "memory store subscription opened");
        Ok(Subscription::new(path, rx))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), RemoteError> {
        self.mutate(path, |slot| {
            *slot = value;
            Ok(())
        })
        .await
    }

    async fn patch(&self, path: &str, value: Value) -> Result<(), RemoteError> {
        let Value::Object(fields) = value else {
            return Err(RemoteError::Rejected(format!("patch at {path} is not an object")));
        };
        self.mutate(path, |slot| {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(target) = slot {
                for (key, field) in fields {
                    if field.is_null() {
                        target.remove(&key);
                    } else {
                        target.insert(key, field);
                    }
                }
            }
            Ok(())
        })
        .await
    }

    async fn remove(&self, path: &str) -> Result<(), RemoteError> {
        self.mutate(path, |slot| {
            *slot = Value::Null;
            Ok(())
        })
        .await
    }

    async fn append(&self, path: &str, value: Value) -> Result<String, RemoteError> {
        let key = {
            let mut inner = self.inner.lock().await;
            if let Some(failure) = inner.failure.clone() {
                return Err(failure);
            }
            inner.next_key()
        };
        self.write(&format!("{path}/{key}"), value).await?;
        Ok(key)
    }
}

fn lookup<'a>(root: &'a Value, segs: &[&str]) -> Option<&'a Value> {
    segs.iter().try_fold(root, |node, seg| node.get(*seg)).filter(|v| !v.is_null())
}

/// The slot at `segs`, creating intermediate objects over anything that is not one.
fn slot<'a>(root: &'a mut Value, segs: &[&str]) -> &'a mut Value {
    segs.iter().fold(root, |node, seg| {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        match node {
            Value::Object(map) => map.entry((*seg).to_owned()).or_insert(Value::Null),
            other => other,
        }
    })
}

/// Drop `null` leaves and objects left empty by a removal.
fn prune(node: &mut Value) {
    if let Value::Object(map) = node {
        for child in map.values_mut() {
            prune(child);
        }
        map.retain(|_, child| !child.is_null() && !child.as_object().is_some_and(Map::is_empty));
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
