//! Frame coalescing for continuous gestures.
//!
//! Pointer and wheel events can arrive many times between two animation
//! frames. Handlers park the newest value in a [`Coalesced`] slot and the
//! engine drains every slot once per tick, so at most one state commit
//! happens per frame no matter how fast input arrives.

#[cfg(test)]
#[path = "coalesce_test.rs"]
mod coalesce_test;

/// Latest pending update, applied at most once per tick.
///
/// Scheduling a new value replaces (cancels) whatever was pending.
#[derive(Debug, Clone)]
pub struct Coalesced<T> {
    pending: Option<T>,
}

impl<T> Default for Coalesced<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Coalesced<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `value` for the next tick, dropping any earlier pending value.
    pub fn schedule(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// Take the pending value for this tick, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drop the pending value without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
