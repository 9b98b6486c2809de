//! Header typing animation: type the title, hold, erase it, pause, repeat.
//!
//! The effect is a two-flag machine (`typing`, characters shown) driven by a
//! single deadline. Each step schedules the next one; [`TypingEffect::stop`]
//! clears the deadline so nothing fires after the header is torn down.

#[cfg(test)]
#[path = "typing_test.rs"]
mod typing_test;

use std::time::{Duration, Instant};

use crate::consts::{TYPING_CHAR_MS, TYPING_DELETE_MS, TYPING_HOLD_MS, TYPING_RESTART_MS, TYPING_TEXT};

/// Floor on step delays so catching up always terminates.
const MIN_STEP: Duration = Duration::from_millis(1);

/// Step delays of the typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingTimings {
    pub type_char: Duration,
    pub hold: Duration,
    pub delete_char: Duration,
    pub restart: Duration,
}

impl Default for TypingTimings {
    fn default() -> Self {
        Self {
            type_char: Duration::from_millis(TYPING_CHAR_MS),
            hold: Duration::from_millis(TYPING_HOLD_MS),
            delete_char: Duration::from_millis(TYPING_DELETE_MS),
            restart: Duration::from_millis(TYPING_RESTART_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypingEffect {
    text: String,
    /// Byte offset after each character, so slicing stays on char boundaries.
    boundaries: Vec<usize>,
    timings: TypingTimings,
    shown: usize,
    typing: bool,
    deadline: Option<Instant>,
}

impl Default for TypingEffect {
    fn default() -> Self {
        Self::new(TYPING_TEXT, TypingTimings::default())
    }
}

impl TypingEffect {
    #[must_use]
    pub fn new(text: &str, timings: TypingTimings) -> Self {
        let boundaries = text.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        Self { text: text.to_owned(), boundaries, timings, shown: 0, typing: true, deadline: None }
    }

    /// Start (or restart) from an empty title.
    pub fn start_at(&mut self, now: Instant) {
        self.shown = 0;
        self.typing = true;
        self.deadline = Some(now + self.step_delay().max(MIN_STEP));
    }

    /// Stop the animation; later polls do nothing.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// The currently visible prefix of the title.
    #[must_use]
    pub fn visible(&self) -> &str {
        let end = match self.shown {
            0 => 0,
            n => self.boundaries.get(n - 1).copied().unwrap_or(self.text.len()),
        };
        &self.text[..end]
    }

    /// When the next step is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run every step due by `now`. Returns whether the visible text changed.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        let before = self.shown;
        while let Some(due) = self.deadline.filter(|due| *due <= now) {
            self.step();
            self.deadline = Some(due + self.step_delay().max(MIN_STEP));
        }
        self.shown != before
    }

    fn step(&mut self) {
        let len = self.boundaries.len();
        match (self.typing, self.shown) {
            (true, n) if n < len => self.shown += 1,
            (true, _) => self.typing = false,
            (false, n) if n > 0 => self.shown -= 1,
            (false, _) => self.typing = true,
        }
    }

    /// Delay before the step that follows the current state.
    fn step_delay(&self) -> Duration {
        let len = self.boundaries.len();
        match (self.typing, self.shown) {
            (true, n) if n < len => self.timings.type_char,
            (true, _) => self.timings.hold,
            (false, n) if n > 0 => self.timings.delete_char,
            (false, _) => self.timings.restart,
        }
    }
}
