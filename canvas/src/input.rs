//! Input model: device class, modifier keys, wheel deltas, note controls, and
//! the routing state machine.
//!
//! This module defines the types consumed by the engine. `DeviceClass` and
//! `Modifiers` capture how the user is interacting at the time of an event.
//! `InputState` records which controller owns the gesture in progress between
//! pointer-down and pointer-up so subsequent moves are routed consistently.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::note::NoteId;

/// Whether the primary input device can hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    /// Mouse or trackpad; single click brings to front, double click edits.
    #[default]
    Hover,
    /// Touch-only; single tap reveals controls, double tap opens the viewer.
    TouchOnly,
}

impl DeviceClass {
    /// Parse the configuration spelling (`hover` / `touch`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hover" => Some(Self::Hover),
            "touch" | "touch-only" | "touch_only" => Some(Self::TouchOnly),
            _ => None,
        }
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Meta turns wheel input into zoom.
    #[must_use]
    pub fn zooms(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Per-note control buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Edit,
    Delete,
}

/// Persistent UI state visible to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Input device class of this client.
    pub device: DeviceClass,
    /// The note whose control buttons are currently revealed, if any.
    pub controls_for: Option<NoteId>,
}

/// Which controller owns the gesture in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A single pointer went down on the background and pans the viewport.
    Panning,
    /// Two touches are down and pinch-zoom the viewport.
    Pinching,
    /// A single pointer went down on a note and drags it.
    OnNote {
        /// Id of the note under the pointer at pointer-down.
        id: NoteId,
    },
}
