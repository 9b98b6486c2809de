#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Sub};

use crate::consts::{GRID_SPACING_PX, ZOOM_MAX, ZOOM_MIN};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Size of the visible viewport in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Viewport transform mapping world coordinates onto the screen.
///
/// `pan` is in CSS pixels and is applied before `zoom` scales the world
/// around its origin, i.e. `screen = world * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::default() }
    }
}

impl Viewport {
    /// A zoom-1 viewport with the world canvas centred on `screen`.
    #[must_use]
    pub fn centered(screen: ScreenSize, canvas_size: f64) -> Self {
        Self {
            zoom: 1.0,
            pan: Point::new((screen.width - canvas_size) / 2.0, (screen.height - canvas_size) / 2.0),
        }
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan.x) / self.zoom,
            y: (screen.y - self.pan.y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan.x,
            y: world.y * self.zoom + self.pan.y,
        }
    }

    /// Zoom as a whole percentage, as shown in the toolbar.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }

    /// Pitch of the background dot grid at the current zoom.
    #[must_use]
    pub fn grid_spacing(&self) -> f64 {
        GRID_SPACING_PX * self.zoom
    }
}

/// Clamp a zoom factor to `[ZOOM_MIN, ZOOM_MAX]`. NaN collapses to the minimum.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return ZOOM_MIN;
    }
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Clamp a pan offset so the world canvas cannot leave the viewport.
///
/// Horizontal pan is kept within `[screen.width - canvas_size, 0]` and
/// vertical pan within `[screen.height - canvas_size, 0]`. When the screen is
/// larger than the canvas the lower bound wins.
#[must_use]
pub fn clamp_pan(pan: Point, screen: ScreenSize, canvas_size: f64) -> Point {
    let min_x = screen.width - canvas_size;
    let min_y = screen.height - canvas_size;
    Point {
        x: pan.x.min(0.0).max(min_x),
        y: pan.y.min(0.0).max(min_y),
    }
}

