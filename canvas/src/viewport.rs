//! Viewport controller: wheel, drag, and pinch gestures mapped to `{zoom, pan}`.
//!
//! DESIGN
//! ======
//! Continuous gestures never mutate the committed viewport directly. Each
//! event computes a clamped target from the committed state and parks it in a
//! single [`Coalesced`] slot shared by wheel, drag-pan, and pinch; [`tick`]
//! commits at most one target per frame. Drag-pan and pinch measure from the
//! anchor captured at gesture start rather than re-basing every frame, so
//! dropped intermediate events never cause drift.
//!
//! Pan targets are gated by the [`DragGate`]. The gate is checked when the
//! event arrives and again when the target is committed, so a note drag that
//! starts mid-frame still wins.
//!
//! Toolbar operations (`zoom_in`, `zoom_out`, `reset`) commit immediately and
//! cancel any pending target computed against the old state.
//!
//! [`tick`]: ViewportController::tick

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::camera::{Point, ScreenSize, Viewport, clamp_pan, clamp_zoom};
use crate::coalesce::Coalesced;
use crate::consts::{TOOLBAR_ZOOM_STEP, WHEEL_PAN_DAMPING, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use crate::drag::DragGate;
use crate::input::{Modifiers, WheelDelta};

/// A committed change to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewChange {
    pub before: Viewport,
    pub after: Viewport,
}

impl ViewChange {
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn zoom_changed(&self) -> bool {
        self.before.zoom != self.after.zoom
    }

    #[must_use]
    pub fn pan_changed(&self) -> bool {
        self.before.pan != self.after.pan
    }
}

#[derive(Debug, Clone, Copy)]
struct Target {
    view: Viewport,
    /// Subject to the drag gate at commit time.
    pans: bool,
}

#[derive(Debug, Clone, Copy)]
struct PanAnchor {
    pointer: Point,
    pan: Point,
}

#[derive(Debug, Clone, Copy)]
struct PinchAnchor {
    distance: f64,
    midpoint: Point,
    zoom: f64,
    pan: Point,
}

/// Owns the committed viewport and turns gestures into clamped updates.
#[derive(Debug)]
pub struct ViewportController {
    view: Viewport,
    screen: ScreenSize,
    canvas_size: f64,
    gate: DragGate,
    pending: Coalesced<Target>,
    pan: Option<PanAnchor>,
    pinch: Option<PinchAnchor>,
}

impl ViewportController {
    /// A controller showing the canvas centred at zoom 1.
    #[must_use]
    pub fn new(screen: ScreenSize, canvas_size: f64, gate: DragGate) -> Self {
        let centered = Viewport::centered(screen, canvas_size);
        Self {
            view: Viewport { zoom: 1.0, pan: clamp_pan(centered.pan, screen, canvas_size) },
            screen,
            canvas_size,
            gate,
            pending: Coalesced::new(),
            pan: None,
            pinch: None,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.view
    }

    #[must_use]
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    #[must_use]
    pub fn canvas_size(&self) -> f64 {
        self.canvas_size
    }

    /// A drag-pan or pinch is in progress.
    #[must_use]
    pub fn is_gesturing(&self) -> bool {
        self.pan.is_some() || self.pinch.is_some()
    }

    // --- Wheel ---

    /// Wheel or trackpad scroll. Ctrl/Meta zooms; otherwise the wall pans.
    pub fn wheel(&mut self, delta: WheelDelta, modifiers: Modifiers) {
        if modifiers.zooms() {
            let factor = if delta.dy > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
            let view = Viewport { zoom: clamp_zoom(self.view.zoom * factor), pan: self.view.pan };
            self.pending.schedule(Target { view, pans: false });
            return;
        }
        if self.gate.is_engaged() {
            return;
        }
        let shifted = self.view.pan - Point::new(delta.dx * WHEEL_PAN_DAMPING, delta.dy * WHEEL_PAN_DAMPING);
        self.schedule_pan(self.view.zoom, shifted);
    }

    // --- Single-pointer pan ---

    /// Start panning from `pointer` (screen coordinates).
    ///
    /// Refused while a note drag holds the gate.
    pub fn pan_start(&mut self, pointer: Point) -> bool {
        if self.gate.is_engaged() {
            return false;
        }
        self.pinch = None;
        self.pan = Some(PanAnchor { pointer, pan: self.view.pan });
        true
    }

    /// Pan by the pointer's cumulative delta since [`pan_start`](Self::pan_start).
    pub fn pan_move(&mut self, pointer: Point) {
        let Some(anchor) = self.pan else {
            return;
        };
        if self.gate.is_engaged() {
            return;
        }
        self.schedule_pan(self.view.zoom, anchor.pan + (pointer - anchor.pointer));
    }

    /// Finish the pan, committing whatever is still pending.
    pub fn pan_end(&mut self) -> Option<ViewChange> {
        self.pan.take()?;
        self.tick()
    }

    // --- Pinch ---

    /// Start a two-finger pinch. Refused while a note drag holds the gate.
    pub fn pinch_start(&mut self, a: Point, b: Point) -> bool {
        if self.gate.is_engaged() {
            return false;
        }
        self.pan = None;
        self.pinch = Some(PinchAnchor {
            distance: a.distance(b),
            midpoint: a.midpoint(b),
            zoom: self.view.zoom,
            pan: self.view.pan,
        });
        true
    }

    /// Zoom by the ratio of finger distances and pan by the midpoint delta.
    pub fn pinch_move(&mut self, a: Point, b: Point) {
        let Some(anchor) = self.pinch else {
            return;
        };
        if self.gate.is_engaged() {
            return;
        }
        let zoom = if anchor.distance > 0.0 {
            clamp_zoom(anchor.zoom * (a.distance(b) / anchor.distance))
        } else {
            anchor.zoom
        };
        self.schedule_pan(zoom, anchor.pan + (a.midpoint(b) - anchor.midpoint));
    }

    /// Finish the pinch, committing whatever is still pending.
    pub fn pinch_end(&mut self) -> Option<ViewChange> {
        self.pinch.take()?;
        self.tick()
    }

    // --- Toolbar ---

    pub fn zoom_in(&mut self) -> Option<ViewChange> {
        self.set_zoom(self.view.zoom * TOOLBAR_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Option<ViewChange> {
        self.set_zoom(self.view.zoom / TOOLBAR_ZOOM_STEP)
    }

    /// Zoom 1, canvas centred in the current screen.
    pub fn reset(&mut self) -> Option<ViewChange> {
        self.pending.cancel();
        let centered = Viewport::centered(self.screen, self.canvas_size);
        let view = Viewport { zoom: 1.0, pan: clamp_pan(centered.pan, self.screen, self.canvas_size) };
        self.commit(view)
    }

    /// Set an absolute zoom, keeping the pan.
    pub fn set_zoom(&mut self, zoom: f64) -> Option<ViewChange> {
        self.pending.cancel();
        let view = Viewport { zoom: clamp_zoom(zoom), pan: self.view.pan };
        self.commit(view)
    }

    /// The visible area changed size; the pan is re-clamped to the new bounds.
    pub fn set_screen(&mut self, screen: ScreenSize) -> Option<ViewChange> {
        self.screen = screen;
        let view = Viewport { zoom: self.view.zoom, pan: clamp_pan(self.view.pan, screen, self.canvas_size) };
        self.commit(view)
    }

    // --- Frame ---

    /// Commit the target parked since the last tick.
    pub fn tick(&mut self) -> Option<ViewChange> {
        let target = self.pending.take()?;
        if target.pans && self.gate.is_engaged() {
            return None;
        }
        self.commit(target.view)
    }

    /// Drop pending targets and gesture anchors without committing.
    pub fn teardown(&mut self) {
        self.pending.cancel();
        self.pan = None;
        self.pinch = None;
    }

    fn schedule_pan(&mut self, zoom: f64, pan: Point) {
        let view = Viewport { zoom, pan: clamp_pan(pan, self.screen, self.canvas_size) };
        self.pending.schedule(Target { view, pans: true });
    }

    fn commit(&mut self, view: Viewport) -> Option<ViewChange> {
        if view == self.view {
            return None;
        }
        let before = self.view;
        self.view = view;
        Some(ViewChange { before, after: view })
    }
}
